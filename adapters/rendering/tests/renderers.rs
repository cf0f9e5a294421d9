use std::time::Duration;

use karel_agent::Agent;
use karel_core::{CommandKind, Corner, Heading, MarkerDirective, Pose, Side, WallDirective};
use karel_rendering::{
    draw_frame, FrameView, SummaryRenderer, TextRenderer, DEFAULT_STEP_DELAY,
};
use karel_world::World;

fn walled_world() -> World {
    let walls = [WallDirective {
        corner: Corner::new(1, 1),
        side: Side::East,
    }];
    let markers = [MarkerDirective {
        corner: Corner::new(2, 2),
        count: 3,
    }];
    World::new(2, 2, &walls, &markers).expect("valid world")
}

fn origin_facing(heading: Heading) -> Pose {
    Pose::at_corner(Corner::new(1, 1), heading).expect("valid corner")
}

#[test]
fn frame_draws_walls_markers_and_agent() {
    let world = walled_world();
    let view = FrameView {
        pose: origin_facing(Heading::East),
        markers_in_bag: 0,
        steps: 0,
        last_command: CommandKind::TurnOn,
    };

    let expected = "\
0 turn_on
CORNER (1, 1)  FACING east  BAG 0  MARKERS 0
ST.
   +-------+
 2 | .   3 |
   |   +   |
 1 | > | . |
   +-------+
     1   2  AVE.
";
    assert_eq!(draw_frame(&world, &view), expected);
}

#[test]
fn text_renderer_prints_frames_then_shutoff_banner() {
    let renderer = TextRenderer::new(Vec::new()).with_step_delay(Duration::ZERO);
    let mut agent = Agent::power_on(walled_world(), origin_facing(Heading::East), 0, renderer)
        .expect("agent placed");

    let _ = agent.step();

    let (_, renderer) = agent.into_parts();
    let output = String::from_utf8(renderer.into_inner()).expect("utf-8 output");
    assert_eq!(output.matches("ST.\n").count(), 2);
    assert!(output.contains("1 step\n"));
    assert!(output.ends_with("Error Shutoff! (Can't move this way)\n"));
}

#[test]
fn summary_renderer_reports_only_shutoffs() {
    let renderer = SummaryRenderer::new(Vec::new());
    let mut agent = Agent::power_on(walled_world(), origin_facing(Heading::North), 0, renderer)
        .expect("agent placed");

    let _ = agent.step();
    let _ = agent.turn_left();
    let _ = agent.pick_marker();

    let (_, renderer) = agent.into_parts();
    let output = String::from_utf8(renderer.into_inner()).expect("utf-8 output");
    assert_eq!(output, "Error Shutoff! (There is no marker at the corner)\n");
}

#[test]
fn step_delay_defaults_to_one_second_and_can_change() {
    let mut renderer = TextRenderer::new(Vec::new());
    assert_eq!(renderer.step_delay(), DEFAULT_STEP_DELAY);
    assert_eq!(renderer.step_delay(), Duration::from_millis(1000));

    renderer.set_step_delay(Duration::from_millis(5));

    assert_eq!(renderer.step_delay(), Duration::from_millis(5));
}
