mod common;

use camera_capture_core::{LogicalCamera, SessionState, SetupOutcome};
use camera_capture_virtual::VirtualPlatform;

use common::Harness;

#[test]
fn last_requested_camera_wins() {
    let harness = Harness::standard();

    for camera in [
        LogicalCamera::Back,
        LogicalCamera::Front,
        LogicalCamera::Back,
        LogicalCamera::Front,
        LogicalCamera::Back,
    ] {
        harness.controller.set_active_camera(camera);
    }

    assert_eq!(harness.controller.current_camera(), LogicalCamera::Back);
    assert_eq!(harness.controller.connected_camera(), Some(LogicalCamera::Back));
    assert_eq!(harness.platform.probe().connected_positions(), vec![LogicalCamera::Back]);
}

#[test]
fn intent_is_visible_before_the_switch_runs() {
    let harness = Harness::standard();
    assert_eq!(harness.controller.connected_camera(), Some(LogicalCamera::Front));

    harness.controller.set_active_camera(LogicalCamera::Back);
    assert_eq!(harness.controller.current_camera(), LogicalCamera::Back);
}

#[test]
fn selecting_the_current_camera_is_a_no_op() {
    let harness = Harness::standard();
    assert_eq!(harness.controller.connected_camera(), Some(LogicalCamera::Front));
    let before = harness.controller.configuration_transaction_count();

    harness.controller.set_active_camera(LogicalCamera::Front);
    harness.controller.set_active_camera(LogicalCamera::Front);

    assert_eq!(harness.controller.connected_camera(), Some(LogicalCamera::Front));
    assert_eq!(harness.controller.configuration_transaction_count(), before);
}

#[test]
fn switching_away_and_back_reuses_the_original_input() {
    let harness = Harness::standard();
    let probe = harness.platform.probe();
    let front = harness.controller.device_input(LogicalCamera::Front);
    assert!(front.is_some());

    harness.controller.set_active_camera(LogicalCamera::Back);
    assert_eq!(harness.controller.connected_camera(), Some(LogicalCamera::Back));
    harness.controller.set_active_camera(LogicalCamera::Front);

    assert_eq!(harness.controller.connected_input(), front);
    assert_eq!(harness.controller.configuration_transaction_count(), 3);
    assert_eq!(probe.commits(), 3);
    assert_eq!(probe.input_ids(), vec![front.unwrap()]);
}

#[test]
fn every_graph_change_is_bracketed() {
    let harness = Harness::running();
    let probe = harness.platform.probe();

    for camera in [LogicalCamera::Back, LogicalCamera::Front, LogicalCamera::Back] {
        harness.controller.set_active_camera(camera);
    }
    harness.controller.stop_running();
    harness.wait_for_state(SessionState::Stopped);

    assert_eq!(probe.unbracketed_mutations(), 0);
    assert!(!probe.is_configuring());
    assert_eq!(probe.commits(), harness.controller.configuration_transaction_count());
}

#[test]
fn preview_follows_the_connected_input() {
    let harness = Harness::standard();
    let preview = harness.controller.preview_layer();
    assert_eq!(harness.controller.connected_camera(), Some(LogicalCamera::Front));
    assert_eq!(preview.connected_camera(), Some(LogicalCamera::Front));

    harness.controller.set_active_camera(LogicalCamera::Back);
    assert_eq!(harness.controller.connected_camera(), Some(LogicalCamera::Back));
    assert_eq!(preview.connected_camera(), Some(LogicalCamera::Back));
    assert_eq!(preview.connected_input(), harness.controller.connected_input());
}

#[test]
fn switching_while_setup_failed_is_rejected() {
    let harness = Harness::new(VirtualPlatform::builder().photo_output_unavailable());
    // Waits for setup to finish.
    harness.controller.pending_capture_count();
    assert_eq!(harness.controller.state(), SessionState::Ready(SetupOutcome::Failed));
    let before = harness.controller.configuration_transaction_count();

    harness.controller.set_active_camera(LogicalCamera::Back);

    assert_eq!(harness.controller.current_camera(), LogicalCamera::Front);
    assert_eq!(harness.controller.configuration_transaction_count(), before);
}
