mod common;

use boxloop::{
    run_loop, BoxScene, Color, IVec2, Key, PlatformEvent, Rect, SceneConfig, UVec2, Viewport,
};
use common::{Call, ScriptedPlatform};

fn box_at(x: i32, y: i32) -> Rect {
    Rect::new(IVec2::new(x, y), UVec2::new(50, 50))
}

#[test]
fn test_right_down_then_idle_scenario() {
    let mut platform = ScriptedPlatform::new()
        .hold(&[Key::Right], 10)
        .hold(&[Key::Down], 4)
        .idle(5)
        .close();
    let mut scene = BoxScene::default();

    let stats = run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(stats.frames, 19);
    assert_eq!(scene.position(), IVec2::new(150, 120));

    let rects = platform.rects();
    assert_eq!(rects.len(), 19);
    assert_eq!(rects[9], box_at(150, 100));
    assert_eq!(rects[13], box_at(150, 120));
    assert!(rects[14..].iter().all(|rect| *rect == box_at(150, 120)));
}

#[test]
fn test_position_is_updated_before_drawing() {
    let mut platform = ScriptedPlatform::new().hold(&[Key::Right], 1).close();
    let mut scene = BoxScene::default();

    run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(platform.rects(), vec![box_at(105, 100)]);
}

#[test]
fn test_each_frame_is_clear_draw_present() {
    let mut platform = ScriptedPlatform::new().idle(3).close();
    let mut scene = BoxScene::default();

    run_loop(&mut platform, &mut scene).unwrap();

    let frame = [
        Call::Clear(Color::WHITE),
        Call::DrawRect(box_at(100, 100), Color::BLUE),
        Call::Present,
    ];
    assert_eq!(platform.calls, frame.repeat(3));
}

#[test]
fn test_close_stops_before_any_drawing_in_that_frame() {
    let mut platform = ScriptedPlatform::new()
        .hold(&[Key::Right], 3)
        .frame(&[PlatformEvent::CloseRequested], &[Key::Right])
        .hold(&[Key::Right], 5);
    let mut scene = BoxScene::default();

    let stats = run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(stats.frames, 3);
    assert_eq!(platform.polls, 4);
    assert_eq!(platform.presents(), 3);
    assert_eq!(platform.calls.last(), Some(&Call::Present));
    // The close frame had Right held, but the box did not move.
    assert_eq!(scene.position(), IVec2::new(115, 100));
}

#[test]
fn test_close_on_first_poll_draws_nothing() {
    let mut platform = ScriptedPlatform::new().close();
    let mut scene = BoxScene::default();

    let stats = run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(stats.frames, 0);
    assert!(platform.calls.is_empty());
    assert_eq!(scene.position(), IVec2::new(100, 100));
}

#[test]
fn test_close_among_other_events_still_closes() {
    let resize = PlatformEvent::Resized {
        width: 800,
        height: 600,
    };
    let mut platform = ScriptedPlatform::new()
        .idle(2)
        .frame(&[resize, PlatformEvent::CloseRequested, resize], &[]);
    let mut scene = BoxScene::default();

    let stats = run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(stats.frames, 2);
}

#[test]
fn test_resize_does_not_interrupt_frames() {
    let resize = PlatformEvent::Resized {
        width: 1024,
        height: 768,
    };
    let mut platform = ScriptedPlatform::new()
        .hold(&[Key::Down], 2)
        .frame(&[resize], &[Key::Down])
        .hold(&[Key::Down], 2)
        .close();
    let mut scene = BoxScene::default();

    let stats = run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(stats.frames, 5);
    assert_eq!(scene.position(), IVec2::new(100, 125));
}

#[test]
fn test_opposing_keys_hold_position() {
    let mut platform = ScriptedPlatform::new()
        .hold(&[Key::Left, Key::Right], 7)
        .hold(&[Key::Up, Key::Down], 7)
        .close();
    let mut scene = BoxScene::default();

    run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(scene.position(), IVec2::new(100, 100));
    assert!(platform.rects().iter().all(|rect| *rect == box_at(100, 100)));
}

#[test]
fn test_box_leaves_viewport_without_error() {
    let viewport = Viewport::new(800, 600);
    let mut platform = ScriptedPlatform::new()
        .hold(&[Key::Right, Key::Down], 10)
        .close();
    let mut scene = BoxScene::new(SceneConfig::default().with_start(790, 590));

    let stats = run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(stats.frames, 10);
    assert_eq!(scene.position(), IVec2::new(840, 640));
    assert!(scene.position().x >= viewport.width as i32);
    assert!(scene.position().y >= viewport.height as i32);
    assert!(!viewport.intersects(&scene.mover().rect()));
}

#[test]
fn test_box_goes_negative_moving_up_left() {
    let mut platform = ScriptedPlatform::new()
        .hold(&[Key::Left, Key::Up], 30)
        .close();
    let mut scene = BoxScene::default();

    run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(scene.position(), IVec2::new(-50, -50));
}

#[test]
fn test_box_held_against_integer_limit_keeps_running() {
    let mut platform = ScriptedPlatform::new()
        .hold(&[Key::Right, Key::Down], 3)
        .close();
    let mut scene = BoxScene::new(SceneConfig::default().with_start(i32::MAX - 7, i32::MAX - 2));

    let stats = run_loop(&mut platform, &mut scene).unwrap();

    assert_eq!(stats.frames, 3);
    assert_eq!(scene.position(), IVec2::new(i32::MAX, i32::MAX));
}

#[test]
fn test_platform_errors_end_the_loop() {
    let mut platform = ScriptedPlatform::new().idle(3).close();
    platform.fail_present = true;
    let mut scene = BoxScene::default();

    let err = run_loop(&mut platform, &mut scene).unwrap_err();

    assert!(err.to_string().contains("surface lost"));
    assert_eq!(platform.polls, 1);
}
