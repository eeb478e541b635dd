//! End-to-end viewer scenarios on the headless backend

use crate::command::{Accessory, CameraView, Command, Direction, GameAction, MoveState, PoseName};
use crate::config::ViewerConfig;
use crate::game::GamePhase;
use crate::notify::Notification;
use crate::rig::Part;
use crate::viewer::RobotViewer;
use robolab_3d::{HeadlessBackend, RenderBackend};
use robolab_core::Vec3;
use robolab_platform::{
    GamepadSnapshot, GamepadSource, InputEvent, Key, KeyboardEvent, MouseButton, NullGamepad,
    PointerEvent, ScriptedGamepad, Viewport,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

const DT: f32 = 1.0 / 60.0;

fn config() -> ViewerConfig {
    ViewerConfig {
        rng_seed: Some(7),
        ..Default::default()
    }
}

fn viewport() -> Viewport {
    Viewport::new(960.0, 520.0).unwrap()
}

fn mounted() -> RobotViewer {
    let mut viewer = RobotViewer::headless(config()).unwrap();
    viewer.mount(viewport()).unwrap();
    viewer
}

fn run<B: RenderBackend, G: GamepadSource>(viewer: &mut RobotViewer<B, G>, frames: usize) {
    for _ in 0..frames {
        viewer.tick(DT).unwrap();
    }
}

fn record<B: RenderBackend, G: GamepadSource>(
    viewer: &mut RobotViewer<B, G>,
) -> Rc<RefCell<Vec<Notification>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    viewer.subscribe(move |n| sink.borrow_mut().push(n.clone()));
    log
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_mount_and_unmount_are_idempotent() {
    let mut viewer = RobotViewer::headless(config()).unwrap();
    viewer.mount(viewport()).unwrap();
    let nodes = viewer.scene().len();
    viewer.mount(viewport()).unwrap();
    assert_eq!(viewer.scene().len(), nodes);
    assert_eq!(viewer.listener_count(), 4);
    assert!(viewer.wants_frame());

    run(&mut viewer, 3);
    assert_eq!(viewer.backend().frames_rendered(), 3);

    viewer.unmount();
    viewer.unmount();
    assert!(!viewer.is_mounted());
    assert!(!viewer.wants_frame());
    assert_eq!(viewer.listener_count(), 0);
    assert!(viewer.resource_stats().all_released());
    assert_eq!(viewer.backend().attach_detach_counts(), (1, 1));
}

#[test]
fn test_failed_attach_leaves_nothing_behind() {
    let mut viewer = RobotViewer::new(config(), HeadlessBackend::failing(), NullGamepad).unwrap();
    assert!(viewer.mount(viewport()).is_err());
    assert!(!viewer.is_mounted());
    assert_eq!(viewer.listener_count(), 0);
    assert!(viewer.resource_stats().all_released());
    assert!(viewer.backend().viewport().is_none());

    viewer.unmount();
    assert!(viewer.resource_stats().all_released());
}

#[test]
fn test_remount_reopens_command_queue() {
    let mut viewer = mounted();
    let sender = viewer.sender();
    viewer.unmount();
    assert!(!sender.send(Command::Salute));
    assert!(!viewer.dispatch(Command::Salute));

    viewer.mount(viewport()).unwrap();
    assert!(viewer.dispatch(Command::Salute));
    viewer.tick(DT).unwrap();
    assert!(viewer.is_saluting());
}

#[test]
fn test_unmount_drops_subscribers() {
    let mut viewer = mounted();
    let _log = record(&mut viewer);
    assert_eq!(viewer.subscriber_count(), 1);
    viewer.unmount();
    assert_eq!(viewer.subscriber_count(), 0);
}

#[test]
fn test_invalid_viewport_is_rejected() {
    let mut viewer = RobotViewer::headless(config()).unwrap();
    let bad = Viewport {
        width: 0.0,
        height: 520.0,
    };
    assert!(viewer.mount(bad).is_err());
    assert!(!viewer.is_mounted());
}

#[test]
fn test_frame_time_is_clamped() {
    let mut viewer = mounted();
    viewer.frame(10.0).unwrap();
    assert_eq!(viewer.elapsed(), 0.0);

    viewer.frame(15.0).unwrap();
    assert_eq!(viewer.elapsed(), viewer.config().max_frame_dt);

    viewer.tick(f32::NAN).unwrap();
    viewer.tick(-1.0).unwrap();
    assert_eq!(viewer.elapsed(), viewer.config().max_frame_dt);
}

// ============================================================================
// Movement
// ============================================================================

#[test]
fn test_move_start_then_stop_settles() {
    let mut viewer = mounted();
    viewer.dispatch(Command::Move {
        direction: Direction::Forward,
        state: Some(MoveState::Start),
    });
    run(&mut viewer, 60);
    assert!(viewer.robot_velocity().z < -0.5);
    assert!(viewer.robot_position().z < 0.0);

    viewer.dispatch(Command::Move {
        direction: Direction::Forward,
        state: Some(MoveState::Stop),
    });
    run(&mut viewer, 120);
    assert!(viewer.robot_velocity().length() < 1e-2);
    assert!(!viewer.movement().any());
}

#[test]
fn test_opposing_directions_cancel() {
    let mut viewer = mounted();
    for direction in [Direction::Left, Direction::Right] {
        viewer.dispatch(Command::Move {
            direction,
            state: Some(MoveState::Start),
        });
    }
    run(&mut viewer, 30);
    let movement = viewer.movement();
    assert!(movement.left && movement.right);
    assert!(viewer.robot_velocity().length() < 1e-6);
}

#[test]
fn test_step_pulse_expires() {
    let mut viewer = mounted();
    viewer.dispatch(Command::Move {
        direction: Direction::Right,
        state: None,
    });
    viewer.tick(DT).unwrap();
    assert!(viewer.movement().right);

    run(&mut viewer, 30);
    assert!(!viewer.movement().right);
    assert!(viewer.robot_position().x > 0.0);
}

#[test]
fn test_keyboard_drives_movement() {
    let mut viewer = mounted();
    viewer.handle_input(InputEvent::Keyboard(KeyboardEvent::pressed(Key::W)));
    run(&mut viewer, 10);
    assert!(viewer.movement().forward);

    viewer.handle_input(InputEvent::Keyboard(KeyboardEvent::released(Key::W)));
    viewer.tick(DT).unwrap();
    assert!(!viewer.movement().forward);
}

#[test]
fn test_speed_is_clamped() {
    let mut viewer = mounted();
    assert!(viewer.dispatch_named("robot3d-speed", &json!(10)));
    viewer.tick(DT).unwrap();
    assert_eq!(viewer.speed_scale(), viewer.config().locomotion.speed_max);
}

#[test]
fn test_auto_walk_moves_robot() {
    let mut viewer = mounted();
    assert!(viewer.dispatch_named("walk", &json!({ "mode": "start", "pattern": "circle" })));
    run(&mut viewer, 60);
    assert!(viewer.is_auto_walking());
    assert!(viewer.robot_velocity().length() > 0.1);

    viewer.dispatch_named("walk", &json!({ "mode": "stop" }));
    viewer.tick(DT).unwrap();
    assert!(!viewer.is_auto_walking());
}

#[test]
fn test_gamepad_disconnect_clears_intents() {
    let mut pad = ScriptedGamepad::new();
    let mut snapshot = GamepadSnapshot::with_stick(0, 0.0, -1.0);
    snapshot.set_button(1, true);
    pad.push(snapshot);
    let mut viewer = RobotViewer::new(config(), HeadlessBackend::new(), pad).unwrap();
    viewer.mount(viewport()).unwrap();

    viewer.handle_input(InputEvent::Keyboard(KeyboardEvent::pressed(Key::D)));
    viewer.tick(DT).unwrap();
    assert!(viewer.movement().forward);
    assert!(viewer.movement().right);
    assert!(viewer.is_waving());

    viewer.gamepad_mut().push(GamepadSnapshot::disconnected(0));
    viewer.tick(DT).unwrap();
    assert!(!viewer.movement().any());
    assert!(!viewer.is_waving());
}

#[test]
fn test_gamepad_button_salutes_once_per_press() {
    let mut pad = ScriptedGamepad::new();
    let mut snapshot = GamepadSnapshot::with_stick(0, 0.0, 0.0);
    snapshot.set_button(0, true);
    pad.push(snapshot);
    let mut viewer = RobotViewer::new(config(), HeadlessBackend::new(), pad).unwrap();
    viewer.mount(viewport()).unwrap();

    viewer.tick(DT).unwrap();
    assert!(viewer.is_saluting());
    assert!(!viewer.movement().any());

    // holding the button past the salute does not start another
    run(&mut viewer, 120);
    assert!(!viewer.is_saluting());

    viewer.gamepad_mut().push(GamepadSnapshot::with_stick(0, 0.0, 0.0));
    viewer.tick(DT).unwrap();
    let mut pressed = GamepadSnapshot::with_stick(0, 0.0, 0.0);
    pressed.set_button(0, true);
    viewer.gamepad_mut().push(pressed);
    viewer.tick(DT).unwrap();
    assert!(viewer.is_saluting());
}

// ============================================================================
// Poses and accessories
// ============================================================================

#[test]
fn test_arms_up_then_reset() {
    let mut viewer = mounted();
    viewer.dispatch_named("pose", &json!("arms-up"));
    run(&mut viewer, 120);
    let up = viewer.config().pose.arms_up_angle;
    for part in [Part::LeftArmPivot, Part::RightArmPivot] {
        assert!((viewer.part_rotation(part).unwrap().x - up).abs() < 1e-2);
    }

    viewer.dispatch(Command::Pose(PoseName::Reset));
    run(&mut viewer, 120);
    for part in [Part::LeftArmPivot, Part::RightArmPivot] {
        assert!(viewer.part_rotation(part).unwrap().x.abs() < 1e-2);
    }
    assert_eq!(viewer.targets().unwrap().explicit_count(), 0);
}

#[test]
fn test_head_left_turns_neck() {
    let mut viewer = mounted();
    viewer.dispatch(Command::Pose(PoseName::HeadLeft));
    run(&mut viewer, 120);
    let turn = viewer.config().pose.head_turn;
    assert!((viewer.part_rotation(Part::Neck).unwrap().y + turn).abs() < 1e-2);
}

#[test]
fn test_accessory_toggle_converges() {
    let mut viewer = mounted();
    assert!(!viewer.accessory_visible(Accessory::Wings));

    viewer.dispatch(Command::Accessory {
        accessory: Accessory::Wings,
        enabled: true,
    });
    run(&mut viewer, 180);
    assert_eq!(viewer.accessory_blend(Accessory::Wings), Some(1.0));
    assert!(viewer.accessory_visible(Accessory::Wings));

    viewer.dispatch(Command::Accessory {
        accessory: Accessory::Wings,
        enabled: false,
    });
    run(&mut viewer, 180);
    assert_eq!(viewer.accessory_blend(Accessory::Wings), Some(0.0));
    assert!(!viewer.accessory_visible(Accessory::Wings));
}

#[test]
fn test_malformed_named_commands_are_ignored() {
    let mut viewer = mounted();
    assert!(!viewer.dispatch_named("accessory", &json!({ "name": "jetpack", "enabled": true })));
    assert!(!viewer.dispatch_named("pose", &json!(7)));
    assert!(!viewer.dispatch_named("unknown", &json!({})));
    run(&mut viewer, 5);
    assert_eq!(viewer.targets().unwrap().explicit_count(), 0);
    for accessory in Accessory::ALL {
        assert_eq!(viewer.accessory_blend(accessory), Some(0.0));
    }
}

// ============================================================================
// Camera and picking
// ============================================================================

#[test]
fn test_top_view_then_drag_starts_from_view() {
    let mut viewer = mounted();
    viewer.dispatch(Command::SetView(CameraView::Top));
    viewer.tick(DT).unwrap();
    let top = Vec3::from(viewer.config().camera.views.top);
    assert_eq!(viewer.camera().unwrap().position, top);

    viewer.handle_input(InputEvent::Pointer(PointerEvent::ButtonPressed {
        button: MouseButton::Left,
        x: 400.0,
        y: 260.0,
    }));
    viewer.handle_input(InputEvent::Pointer(PointerEvent::Moved { x: 420.0, y: 260.0 }));
    viewer.tick(DT).unwrap();

    let position = viewer.camera().unwrap().position;
    assert!(position.distance(top) < 0.1);
    assert!(position.y > 5.5);
}

#[test]
fn test_wheel_zooms_camera() {
    let mut viewer = mounted();
    let before = viewer.orbit().unwrap().distance;
    viewer.handle_input(InputEvent::Wheel { delta_y: 120.0 });
    run(&mut viewer, 60);
    assert!(viewer.orbit().unwrap().distance != before);
}

#[test]
fn test_hover_publishes_part_changes() {
    let mut viewer = mounted();
    let log = record(&mut viewer);
    viewer.dispatch(Command::SetView(CameraView::Front));
    viewer.tick(DT).unwrap();

    viewer.handle_input(InputEvent::Pointer(PointerEvent::Moved { x: 480.0, y: 260.0 }));
    viewer.tick(DT).unwrap();
    assert_eq!(viewer.hovered(), Some(Part::Torso));
    let torso = viewer.rig().unwrap().node(Part::Torso);
    assert_eq!(viewer.outline_selection(), Some(torso));

    viewer.handle_input(InputEvent::Pointer(PointerEvent::Moved { x: 481.0, y: 260.0 }));
    viewer.tick(DT).unwrap();

    viewer.handle_input(InputEvent::Pointer(PointerEvent::Left));
    viewer.tick(DT).unwrap();
    assert_eq!(viewer.hovered(), None);
    assert_eq!(
        *log.borrow(),
        vec![
            Notification::PieceHover {
                name: Some("torso")
            },
            Notification::PieceHover { name: None },
        ]
    );
}

// ============================================================================
// Mini-game
// ============================================================================

#[test]
fn test_game_start_publishes_score_and_life() {
    let mut viewer = mounted();
    let log = record(&mut viewer);
    viewer.dispatch_named("game", &json!({ "action": "start" }));
    viewer.tick(DT).unwrap();

    assert_eq!(viewer.game_phase(), GamePhase::Active);
    assert_eq!(viewer.life(), (5, 5));
    assert_eq!(
        *log.borrow(),
        vec![
            Notification::GameScore { score: 0 },
            Notification::Life { value: 5, max: 5 }
        ]
    );
}

#[test]
fn test_five_contacts_end_the_game_once() {
    let mut viewer = mounted();
    let log = record(&mut viewer);
    viewer.dispatch(Command::Game(GameAction::Start));
    viewer.tick(DT).unwrap();

    let contact = Vec3::new(0.0, viewer.config().game.contact_height, 0.0);
    for _ in 0..4 {
        viewer.inject_projectile(contact, Vec3::ZERO, 10.0);
        viewer.tick(DT).unwrap();
    }
    assert_eq!(viewer.life(), (1, 5));

    viewer.inject_projectile(Vec3::new(4.0, 1.0, 0.0), Vec3::ZERO, 10.0);
    viewer.inject_projectile(contact, Vec3::ZERO, 10.0);
    viewer.tick(DT).unwrap();

    assert_eq!(viewer.game_phase(), GamePhase::GameOver);
    assert_eq!(viewer.life(), (0, 5));
    assert_eq!(viewer.projectile_count(), 0);

    run(&mut viewer, 30);
    let overs = log
        .borrow()
        .iter()
        .filter(|n| matches!(n, Notification::GameOver { .. }))
        .count();
    assert_eq!(overs, 1);
    assert_eq!(log.borrow().last(), Some(&Notification::GameOver { score: 0 }));
}

#[test]
fn test_spawned_projectiles_end_an_unattended_game() {
    let mut viewer = mounted();
    let log = record(&mut viewer);
    viewer.dispatch(Command::Game(GameAction::Start));

    for _ in 0..3600 {
        viewer.tick(DT).unwrap();
        if viewer.game_phase() == GamePhase::GameOver {
            break;
        }
    }
    assert_eq!(viewer.game_phase(), GamePhase::GameOver);
    assert_eq!(viewer.life(), (0, 5));
    assert_eq!(viewer.projectile_count(), 0);

    run(&mut viewer, 120);
    assert_eq!(viewer.projectile_count(), 0);
    let lives: Vec<u32> = log
        .borrow()
        .iter()
        .filter_map(|n| match n {
            Notification::Life { value, .. } => Some(*value),
            _ => None,
        })
        .collect();
    assert_eq!(lives, vec![5, 4, 3, 2, 1, 0]);
    let overs = log
        .borrow()
        .iter()
        .filter(|n| matches!(n, Notification::GameOver { .. }))
        .count();
    assert_eq!(overs, 1);
}

#[test]
fn test_click_intercepts_projectile() {
    let mut viewer = mounted();
    viewer.dispatch(Command::SetView(CameraView::Front));
    viewer.dispatch(Command::Game(GameAction::Start));
    viewer.tick(DT).unwrap();

    // halfway between the front camera and the point it looks at
    let camera = viewer.camera().unwrap();
    let midpoint = (camera.position + camera.target) * 0.5;
    viewer.inject_projectile(midpoint, Vec3::ZERO, 10.0);

    viewer.handle_input(InputEvent::Pointer(PointerEvent::ButtonPressed {
        button: MouseButton::Left,
        x: 480.0,
        y: 260.0,
    }));
    viewer.tick(DT).unwrap();
    assert_eq!(viewer.score(), 1);
    assert_eq!(viewer.projectile_count(), 0);
}

#[test]
fn test_stop_keeps_score_and_clears_projectiles() {
    let mut viewer = mounted();
    viewer.dispatch(Command::Game(GameAction::Start));
    viewer.tick(DT).unwrap();
    viewer.inject_projectile(Vec3::new(4.0, 1.0, 0.0), Vec3::ZERO, 10.0);

    viewer.dispatch(Command::Game(GameAction::Stop));
    viewer.tick(DT).unwrap();
    assert_eq!(viewer.game_phase(), GamePhase::Inactive);
    assert_eq!(viewer.projectile_count(), 0);
}
