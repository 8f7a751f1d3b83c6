//! Property-based tests for the playback controller
//!
//! Random sequences of toggles, stops, end events, and re-syncs must never
//! leave more than one clip playing.

mod support;

use mlc_core::{AudioEvent, HandleId, PlayId};
use proptest::prelude::*;
use support::{manifest_body, FakeBackend, FakeSource, FakeStore, Harness};

#[derive(Debug, Clone)]
enum Op {
    Toggle(usize),
    Stop,
    EndOf(u64, u64),
    EndCurrent,
    Resync(Vec<i64>),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..8).prop_map(Op::Toggle),
        1 => Just(Op::Stop),
        1 => (1u64..12, 1u64..6).prop_map(|(handle, play)| Op::EndOf(handle, play)),
        1 => Just(Op::EndCurrent),
        1 => prop::collection::vec(-5i64..5, 6).prop_map(Op::Resync),
    ]
}

fn body_with_orders(orders: &[i64]) -> String {
    let names = ["A", "B", "C", "D", "E", "F"];
    let paths = ["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3", "f.mp3"];
    let sounds: Vec<(&str, &str, &str, i64)> = orders
        .iter()
        .enumerate()
        .map(|(i, order)| (names[i], paths[i], "tag", *order))
        .collect();
    manifest_body(&sounds)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    /// Property: at most one handle is audible and at most one row is lit,
    /// and both agree with the controller's slot
    #[test]
    fn at_most_one_sound_plays(
        fail_play in prop::collection::vec(any::<bool>(), 6),
        ops in prop::collection::vec(arbitrary_op(), 1..40),
    ) {
        let audio = FakeBackend::default();
        for (path, fails) in ["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3", "f.mp3"]
            .iter()
            .zip(&fail_play)
        {
            if *fails {
                audio.fail_play(path);
            }
        }

        let source = FakeSource::serving(body_with_orders(&[1, 2, 3, 4, 5, 6]));
        let mut h = Harness::with_backend(FakeStore::default(), source, audio);

        runtime().block_on(async {
            h.controller.sync().await.unwrap();

            for op in ops {
                match op {
                    Op::Toggle(index) => {
                        if let Some(row) = h.controller.rows().get(index).map(|r| r.handle) {
                            let _ = h.controller.toggle_row(row).await;
                        }
                    }
                    Op::Stop => {
                        h.controller.stop();
                    }
                    Op::EndOf(handle, play) => {
                        h.controller.handle_audio_event(AudioEvent::Ended {
                            handle: HandleId::new(handle),
                            play: PlayId::new(play),
                        });
                    }
                    Op::EndCurrent => {
                        let current = h.controller.slot().map(|s| (s.handle_id(), s.play_id()));
                        if let Some((handle, play)) = current {
                            let cleared =
                                h.controller.handle_audio_event(AudioEvent::Ended { handle, play });
                            prop_assert!(cleared);
                        }
                    }
                    Op::Resync(orders) => {
                        h.source.serve(body_with_orders(&orders));
                        h.controller.sync().await.unwrap();
                    }
                }

                let lit = h.view.state().playing_names().len();
                let audible = h.audio.playing_count();
                let slot = usize::from(h.controller.slot().is_some());

                prop_assert!(audible <= 1, "{} handles playing", audible);
                prop_assert_eq!(lit, slot);
                prop_assert_eq!(audible, slot);
            }

            Ok(())
        })?;
    }

    /// Property: rendered rows are always in non-decreasing sort order
    #[test]
    fn rows_follow_sort_order(orders in prop::collection::vec(-100i64..100, 6)) {
        let source = FakeSource::serving(body_with_orders(&orders));
        let mut h = Harness::new(FakeStore::default(), source);

        runtime().block_on(async { h.controller.sync().await.unwrap() });

        let rendered: Vec<i64> = h
            .controller
            .rows()
            .iter()
            .filter_map(|row| h.controller.sound_for_row(row.handle).map(|s| s.sort_order))
            .collect();

        prop_assert_eq!(rendered.len(), 6);
        prop_assert!(rendered.windows(2).all(|w| w[0] <= w[1]));
    }
}
