// Notification routing from the controller to registered targets

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use omnilink_bridge::devices::{AreaStatus, UnitStatus, ZoneStatus};
use omnilink_bridge::transport::simulated::SimulatedController;
use omnilink_bridge::{
    AreaTarget, CommandCode, DeviceCommand, DispatchReport, ObjectType, StatusEvent, Target,
    TargetKind, TargetResult, UnitTarget, ZoneTarget,
};

/// Forwards every status it receives to a channel.
struct ChannelTarget<T> {
    tx: mpsc::UnboundedSender<T>,
}

fn channel_target<T>() -> (Arc<ChannelTarget<T>>, mpsc::UnboundedReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelTarget { tx }), rx)
}

impl UnitTarget for ChannelTarget<UnitStatus> {
    fn handle_unit_status(&self, status: &UnitStatus) -> TargetResult {
        self.tx.send(*status)?;
        Ok(())
    }
}

impl ZoneTarget for ChannelTarget<ZoneStatus> {
    fn handle_zone_status(&self, status: &ZoneStatus) -> TargetResult {
        self.tx.send(*status)?;
        Ok(())
    }
}

impl AreaTarget for ChannelTarget<AreaStatus> {
    fn handle_area_status(&self, status: &AreaStatus) -> TargetResult {
        self.tx.send(*status)?;
        Ok(())
    }
}

struct PanickingUnit;

impl UnitTarget for PanickingUnit {
    fn handle_unit_status(&self, _status: &UnitStatus) -> TargetResult {
        panic!("target bug");
    }
}

async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no status delivered")
        .expect("channel closed")
}

#[tokio::test]
async fn test_pushed_status_reaches_target() {
    let sim = Arc::new(SimulatedController::new());
    let bridge = common::activate(&sim).await;

    let (unit, mut units) = channel_target::<UnitStatus>();
    let (area, mut areas) = channel_target::<AreaStatus>();
    bridge.register_target(5, Some(1), Target::Unit(unit));
    bridge.register_target(1, None, Target::Area(area));

    assert!(
        sim.push(vec![
            StatusEvent::Unit(UnitStatus::new(99, 1)),
            StatusEvent::Unit(UnitStatus::new(5, 150).in_area(1)),
            StatusEvent::Area(AreaStatus::new(1, 3)),
        ])
        .await
    );

    let status = next(&mut units).await;
    assert_eq!(status.number, 5);
    assert_eq!(status.decoded().percent(), Some(50));
    assert_eq!(next(&mut areas).await.mode, 3);
}

#[tokio::test]
async fn test_wrong_area_and_wrong_kind_dropped() {
    let sim = Arc::new(SimulatedController::new());
    let bridge = common::activate(&sim).await;

    let (unit, mut units) = channel_target::<UnitStatus>();
    bridge.register_target(5, Some(1), Target::Unit(unit));

    let report = bridge.router().on_notification(&[
        StatusEvent::Unit(UnitStatus::new(5, 1).in_area(2)),
        StatusEvent::Zone(ZoneStatus::new(5, 1)),
    ]);
    assert_eq!(report, DispatchReport { delivered: 0, dropped: 2, failed: 0 });
    assert!(units.try_recv().is_err());
}

#[tokio::test]
async fn test_duplicate_registration_last_writer_wins() {
    let sim = Arc::new(SimulatedController::new());
    let bridge = common::activate(&sim).await;

    let (old, mut old_rx) = channel_target::<ZoneStatus>();
    let (new, mut new_rx) = channel_target::<ZoneStatus>();

    let (logs, _guard) = common::capture_logs();
    assert!(bridge.register_target(3, Some(1), Target::Zone(old)).is_none());
    let replaced = bridge.register_target(3, Some(1), Target::Zone(new));
    assert!(replaced.is_some());
    assert_eq!(bridge.router().registry().conflicts(), 1);
    assert_eq!(logs.count("Duplicate registration"), 1);

    sim.push(vec![StatusEvent::Zone(ZoneStatus::new(3, 1).in_area(1))])
        .await;
    assert_eq!(next(&mut new_rx).await.number, 3);
    assert!(old_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_panicking_target_does_not_stop_delivery() {
    let sim = Arc::new(SimulatedController::new());
    let bridge = common::activate(&sim).await;

    let (good, mut good_rx) = channel_target::<UnitStatus>();
    bridge.register_target(1, None, Target::Unit(Arc::new(PanickingUnit)));
    bridge.register_target(2, None, Target::Unit(good));

    sim.push(vec![StatusEvent::Unit(UnitStatus::new(1, 1))]).await;
    sim.push(vec![StatusEvent::Unit(UnitStatus::new(2, 1))]).await;
    assert_eq!(next(&mut good_rx).await.number, 2);
}

#[tokio::test]
async fn test_deregistered_target_receives_nothing() {
    let sim = Arc::new(SimulatedController::new());
    let bridge = common::activate(&sim).await;

    let (unit, mut units) = channel_target::<UnitStatus>();
    bridge.register_target(4, None, Target::Unit(unit));
    assert!(bridge.deregister_target(TargetKind::Unit, 4).is_some());

    let report = bridge
        .router()
        .on_notification(&[StatusEvent::Unit(UnitStatus::new(4, 1))]);
    assert_eq!(report.dropped, 1);
    assert!(units.try_recv().is_err());
}

#[tokio::test]
async fn test_flag_refresh_and_set() {
    let sim = Arc::new(SimulatedController::new());
    sim.set_status(StatusEvent::Unit(UnitStatus::new(7, 3)));
    let bridge = common::activate(&sim).await;

    let (flag, mut flags) = channel_target::<UnitStatus>();
    bridge.register_target(7, Some(1), Target::Unit(flag));

    let report = bridge.refresh(TargetKind::Unit, 7).await.unwrap();
    assert_eq!(report.delivered, 1);
    assert_eq!(next(&mut flags).await.flag_value(), 3);

    bridge
        .issue_command(ObjectType::Unit, 7, DeviceCommand::SetFlag(9))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(sim.commands(), vec![(CommandCode::UnitOn, 9, 7)]);

    // unknown object
    assert!(bridge.refresh(TargetKind::Unit, 8).await.is_err());
}
