use karel_agent::Agent;
use karel_core::{
    CommandKind, Corner, Event, Fault, GridCoord, Heading, MarkerDirective, Pose, RunState, Side,
    Status, WallDirective,
};
use karel_world::{query, World};

const HEADINGS: [Heading; 4] = [Heading::East, Heading::North, Heading::West, Heading::South];

fn power_on(world: World, corner: Corner, heading: Heading, bag: u32) -> Agent<Vec<Event>> {
    let pose = Pose::at_corner(corner, heading).expect("valid corner");
    Agent::power_on(world, pose, bag, Vec::new()).expect("agent placed")
}

fn walled_world() -> World {
    let walls = [
        WallDirective {
            corner: Corner::new(2, 2),
            side: Side::North,
        },
        WallDirective {
            corner: Corner::new(2, 2),
            side: Side::West,
        },
        WallDirective {
            corner: Corner::new(3, 1),
            side: Side::North,
        },
    ];
    World::new(3, 3, &walls, &[]).expect("valid world")
}

#[test]
fn front_probes_are_complementary_for_every_pose() {
    for avenue in 1..=3 {
        for street in 1..=3 {
            for heading in HEADINGS {
                let agent = power_on(walled_world(), Corner::new(avenue, street), heading, 0);
                assert_eq!(
                    agent.front_is_clear(),
                    !agent.front_is_blocked(),
                    "mismatch at ({avenue}, {street}) facing {heading}"
                );
                assert_eq!(agent.left_is_clear(), !agent.left_is_blocked());
                assert_eq!(agent.right_is_clear(), !agent.right_is_blocked());
            }
        }
    }
}

#[test]
fn side_probes_leave_heading_untouched() {
    let agent = power_on(walled_world(), Corner::new(2, 2), Heading::East, 0);

    assert!(agent.right_is_clear());
    assert!(!agent.left_is_clear(), "wall north of (2, 2)");
    assert_eq!(agent.pose().heading, Heading::East);
    assert_eq!(agent.steps(), 0, "sensors are not commands");
}

#[test]
fn side_probes_see_walls_relative_to_heading() {
    let agent = power_on(walled_world(), Corner::new(2, 2), Heading::South, 0);

    assert!(agent.front_is_clear());
    assert!(agent.left_is_clear(), "east of (2, 2) is open");
    assert!(agent.right_is_blocked(), "wall west of (2, 2)");
}

#[test]
fn four_left_turns_restore_heading() {
    for heading in HEADINGS {
        let mut agent = power_on(walled_world(), Corner::new(1, 1), heading, 0);
        for _ in 0..4 {
            assert_eq!(agent.turn_left(), Status::Completed);
        }
        assert_eq!(agent.pose().heading, heading);
        assert_eq!(agent.steps(), 4);
    }
}

#[test]
fn facing_sensors_compare_against_heading() {
    let agent = power_on(walled_world(), Corner::new(1, 1), Heading::West, 0);

    assert!(agent.facing_west());
    assert!(agent.not_facing_north());
    assert!(agent.not_facing_south());
    assert!(agent.not_facing_east());
    assert!(!agent.facing_east());
    assert!(!agent.not_facing_west());
}

#[test]
fn clear_step_moves_one_corner_and_keeps_markers() {
    let markers = [
        MarkerDirective {
            corner: Corner::new(1, 1),
            count: 2,
        },
        MarkerDirective {
            corner: Corner::new(1, 2),
            count: 5,
        },
    ];
    let world = World::new(3, 3, &[], &markers).expect("valid world");
    let before: Vec<_> = query::corners(&world).collect();
    let mut agent = power_on(world, Corner::new(1, 1), Heading::North, 0);

    assert!(agent.front_is_clear());
    assert_eq!(agent.step(), Status::Completed);

    assert_eq!(agent.pose().corner(), Corner::new(1, 2));
    assert_eq!(agent.pose().position, GridCoord::new(0, 2));
    assert_eq!(agent.pose().heading, Heading::North);
    let after: Vec<_> = query::corners(agent.world()).collect();
    assert_eq!(before, after);
}

#[test]
fn step_reports_vacated_corner() {
    let markers = [MarkerDirective {
        corner: Corner::new(1, 1),
        count: 3,
    }];
    let world = World::new(2, 2, &[], &markers).expect("valid world");
    let mut agent = power_on(world, Corner::new(1, 1), Heading::East, 0);

    assert_eq!(agent.step(), Status::Completed);

    match agent.renderer().last() {
        Some(Event::AgentUpdated {
            changed_corner: Some(update),
            steps,
            last_command,
            ..
        }) => {
            assert_eq!(update.position, GridCoord::new(0, 0));
            assert_eq!(update.cell.markers(), 3);
            assert_eq!(*steps, 1);
            assert_eq!(*last_command, CommandKind::Step);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn blocked_step_halts_in_place() {
    let mut agent = power_on(walled_world(), Corner::new(3, 1), Heading::North, 0);
    let pose = agent.pose();

    assert!(agent.front_is_blocked());
    assert_eq!(agent.step(), Status::Shutoff(Fault::IllegalMove));

    assert_eq!(agent.pose(), pose);
    assert_eq!(agent.state(), RunState::Halted);
    assert_eq!(agent.steps(), 1);
    assert_eq!(agent.last_command(), CommandKind::Step);
}

#[test]
fn world_edge_blocks_like_a_wall() {
    let world = World::new(2, 2, &[], &[]).expect("valid world");
    let mut agent = power_on(world, Corner::new(1, 1), Heading::South, 0);

    assert!(agent.front_is_blocked());
    assert_eq!(agent.step(), Status::Shutoff(Fault::IllegalMove));
}

#[test]
fn put_then_pick_round_trips_corner_and_bag() {
    let markers = [MarkerDirective {
        corner: Corner::new(2, 2),
        count: 4,
    }];
    let world = World::new(3, 3, &[], &markers).expect("valid world");
    let mut agent = power_on(world, Corner::new(2, 2), Heading::East, 2);
    let position = agent.pose().position;

    assert_eq!(agent.put_marker(), Status::Completed);
    assert_eq!(agent.world().markers_at(position), 5);
    assert_eq!(agent.bag(), 1);
    assert_eq!(agent.pick_marker(), Status::Completed);

    assert_eq!(agent.world().markers_at(position), 4);
    assert_eq!(agent.bag(), 2);
}

#[test]
fn pick_from_empty_corner_halts_and_keeps_bag() {
    let world = World::new(2, 2, &[], &[]).expect("valid world");
    let mut agent = power_on(world, Corner::new(2, 2), Heading::East, 3);

    assert!(agent.no_markers_present());
    assert_eq!(agent.pick_marker(), Status::Shutoff(Fault::NoMarkerToPick));

    assert_eq!(agent.bag(), 3);
    assert!(!agent.is_running());
}

#[test]
fn put_with_empty_bag_halts_and_keeps_corner() {
    let markers = [MarkerDirective {
        corner: Corner::new(2, 2),
        count: 1,
    }];
    let world = World::new(2, 2, &[], &markers).expect("valid world");
    let mut agent = power_on(world, Corner::new(2, 2), Heading::East, 0);

    assert!(agent.no_markers_in_bag());
    assert_eq!(agent.put_marker(), Status::Shutoff(Fault::NoMarkerToPlace));

    assert_eq!(agent.world().markers_at(GridCoord::new(2, 2)), 1);
    assert_eq!(agent.bag(), 0);
}

#[test]
fn pick_with_full_bag_halts_without_losing_markers() {
    let markers = [MarkerDirective {
        corner: Corner::new(1, 1),
        count: 1,
    }];
    let world = World::new(2, 2, &[], &markers).expect("valid world");
    let mut agent = power_on(world, Corner::new(1, 1), Heading::East, u32::MAX);
    let before = query::total_markers(agent.world()) + u64::from(agent.bag());

    assert_eq!(agent.pick_marker(), Status::Shutoff(Fault::BagFull));

    assert_eq!(agent.bag(), u32::MAX);
    assert_eq!(agent.world().markers_at(GridCoord::new(0, 0)), 1);
    assert_eq!(
        query::total_markers(agent.world()) + u64::from(agent.bag()),
        before
    );
}

#[test]
fn put_on_full_corner_halts_without_losing_markers() {
    let markers = [MarkerDirective {
        corner: Corner::new(1, 1),
        count: u32::MAX,
    }];
    let world = World::new(2, 2, &[], &markers).expect("valid world");
    let mut agent = power_on(world, Corner::new(1, 1), Heading::East, 2);

    assert_eq!(agent.put_marker(), Status::Shutoff(Fault::CornerFull));

    assert_eq!(agent.bag(), 2);
    assert_eq!(agent.world().markers_at(GridCoord::new(0, 0)), u32::MAX);
    assert!(!agent.is_running());
}

#[test]
fn wall_east_of_start_blocks_the_first_step() {
    let walls = [WallDirective {
        corner: Corner::new(1, 1),
        side: Side::East,
    }];
    let world = World::new(3, 3, &walls, &[]).expect("valid world");
    let mut agent = power_on(world, Corner::new(1, 1), Heading::East, 1);

    assert!(!agent.front_is_clear());
    assert_eq!(agent.step(), Status::Shutoff(Fault::IllegalMove));

    assert_eq!(agent.pose().corner(), Corner::new(1, 1));
    assert_eq!(
        agent.renderer().last(),
        Some(&Event::ErrorShutoff {
            fault: Fault::IllegalMove
        })
    );
    let Some(Event::ErrorShutoff { fault }) = agent.renderer().last() else {
        panic!("missing shutoff event");
    };
    assert_eq!(fault.to_string(), "Can't move this way");
}

#[test]
fn commands_after_shutoff_are_rejected_without_bookkeeping() {
    let world = World::new(2, 2, &[], &[]).expect("valid world");
    let mut agent = power_on(world, Corner::new(1, 1), Heading::East, 0);

    assert_eq!(agent.step(), Status::Completed);
    assert_eq!(agent.pose().corner(), Corner::new(2, 1));
    assert_eq!(agent.put_marker(), Status::Shutoff(Fault::NoMarkerToPlace));
    let events_at_shutoff = agent.renderer().len();

    assert_eq!(agent.pick_marker(), Status::NotRunning);
    assert_eq!(agent.turn_left(), Status::NotRunning);
    assert_eq!(agent.turn_right(), Status::NotRunning);

    assert_eq!(agent.steps(), 2);
    assert_eq!(agent.last_command(), CommandKind::PutMarker);
    assert_eq!(agent.renderer().len(), events_at_shutoff);
    assert_eq!(agent.pose().heading, Heading::East);
}

#[test]
fn snapshot_summarises_agent_state() {
    let markers = [MarkerDirective {
        corner: Corner::new(2, 1),
        count: 6,
    }];
    let world = World::new(2, 2, &[], &markers).expect("valid world");
    let mut agent = power_on(world, Corner::new(1, 1), Heading::East, 0);
    assert_eq!(agent.step(), Status::Completed);

    let snapshot = agent.snapshot();

    assert_eq!(snapshot.corner, Corner::new(2, 1));
    assert_eq!(snapshot.markers_on_corner, 6);
    assert_eq!(snapshot.steps, 1);
    assert_eq!(snapshot.state, RunState::Running);
}
