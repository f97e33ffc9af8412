//! Scenario tests of an operator driving a mecanum robot and running its mechanisms.

use std::{cell::RefCell, rc::Rc};

use hw_if::{
    sim::{SimActuator, SimInputDevice},
    GamepadSnapshot, HardwareMap,
};
use robot_ctrl::{
    controller::RobotController,
    layer::{
        drive::{MecanumDrive, MecanumDriveParams},
        input::{
            AutoShooterMapping, FunctionLayer, GamepadInputGenerator, JoystickHoloDriveMapping,
            TankDriveMapping, TriggerIntakeMapping,
        },
        mechanism::{IntakeLayer, ShooterIntakeLayer, SHOOT_AGITATOR_POWER, SHOOT_FEEDER_POWER},
        Collaborators, Layer, MultiplexLayer, TopLayerSequence, WinLayer,
    },
    task::AUTO_FAR_SHOT_TPS,
};

fn mecanum_hw() -> (HardwareMap, Vec<Rc<RefCell<SimActuator>>>) {
    let mut hw = HardwareMap::new();
    let mut acts = Vec::new();
    for name in MecanumDriveParams::default().motor_names.iter() {
        let act = SimActuator::shared();
        hw.insert(name.as_str(), act.clone());
        acts.push(act);
    }
    (hw, acts)
}

fn powers(acts: &[Rc<RefCell<SimActuator>>]) -> Vec<f64> {
    acts.iter().map(|a| a.borrow().power()).collect()
}

fn teleop(
    mapping: Box<dyn Layer>,
) -> (RobotController, Rc<SimInputDevice>, Vec<Rc<RefCell<SimActuator>>>) {
    let (hw, acts) = mecanum_hw();
    let pad = SimInputDevice::shared();

    let mut controller = RobotController::new();
    controller
        .setup(
            Collaborators::new(hw).with_gamepad(0, pad.clone()),
            vec![
                Box::new(MecanumDrive::default()),
                mapping,
                Box::new(GamepadInputGenerator::layer()),
            ],
        )
        .unwrap();

    (controller, pad, acts)
}

#[test]
fn test_joystick_holonomic() {
    let (mut controller, pad, acts) =
        teleop(Box::new(FunctionLayer::new(JoystickHoloDriveMapping)));

    // Sticks at rest
    assert_eq!(controller.tick().unwrap(), false);
    assert!(powers(&acts).iter().all(|p| *p == 0.0));

    // Left stick pushed fully forwards
    pad.set(GamepadSnapshot {
        left_stick_y: -1.0,
        ..Default::default()
    });
    assert_eq!(controller.tick().unwrap(), false);
    assert!(powers(&acts).iter().all(|p| (*p - 1.0).abs() < 1e-9), "{:?}", powers(&acts));

    // Right stick to the right turns clockwise
    pad.set(GamepadSnapshot {
        right_stick_x: 1.0,
        ..Default::default()
    });
    controller.tick().unwrap();
    let p = powers(&acts);
    assert!(p[0] > 0.0 && p[2] > 0.0, "{:?}", p);
    assert!(p[1] < 0.0 && p[3] < 0.0, "{:?}", p);

    // Operator control never finishes
    for _ in 0..5 {
        assert_eq!(controller.tick().unwrap(), false);
    }
    assert!(controller.is_running());
}

#[test]
fn test_tank_mapping() {
    let (mut controller, pad, acts) = teleop(Box::new(FunctionLayer::new(TankDriveMapping)));

    pad.set(GamepadSnapshot {
        left_stick_y: -0.5,
        right_stick_y: 0.5,
        ..Default::default()
    });
    controller.tick().unwrap();

    let p = powers(&acts);
    assert!((p[0] - 0.5).abs() < 1e-9 && (p[2] - 0.5).abs() < 1e-9, "{:?}", p);
    assert!((p[1] + 0.5).abs() < 1e-9 && (p[3] + 0.5).abs() < 1e-9, "{:?}", p);
}

#[test]
fn test_no_gamepad_fails_setup() {
    let (hw, _) = mecanum_hw();
    let mut controller = RobotController::new();

    let res = controller.setup(
        Collaborators::new(hw),
        vec![
            Box::new(MecanumDrive::default()),
            Box::new(FunctionLayer::new(TankDriveMapping)),
            Box::new(GamepadInputGenerator::layer()),
        ],
    );
    assert!(res.is_err());
}

#[test]
fn test_drive_and_mechanisms_side_by_side() {
    let (mut hw, wheels) = mecanum_hw();
    let mech: Vec<_> = ["intake", "core_hex", "flywheel", "agitator"]
        .iter()
        .map(|name| {
            let act = SimActuator::shared();
            hw.insert(*name, act.clone());
            act
        })
        .collect();
    let (intake, feeder, flywheel, agitator) = (&mech[0], &mech[1], &mech[2], &mech[3]);
    let pad = SimInputDevice::shared();

    let mut controller = RobotController::new();
    controller
        .setup(
            Collaborators::new(hw).with_gamepad(0, pad.clone()),
            vec![
                Box::new(MultiplexLayer::new(vec![
                    Box::new(MecanumDrive::default()),
                    Box::new(IntakeLayer::default()),
                    Box::new(ShooterIntakeLayer::default()),
                ])),
                Box::new(MultiplexLayer::new(vec![
                    Box::new(FunctionLayer::new(JoystickHoloDriveMapping)),
                    Box::new(FunctionLayer::new(TriggerIntakeMapping)),
                    Box::new(FunctionLayer::new(AutoShooterMapping)),
                ])),
                Box::new(TopLayerSequence::new(vec![Box::new(GamepadInputGenerator::layer())])),
            ],
        )
        .unwrap();

    // Driving forwards while taking in and firing a far shot
    pad.set(GamepadSnapshot {
        left_stick_y: -1.0,
        left_trigger: 0.5,
        right_bumper: true,
        ..Default::default()
    });
    assert_eq!(controller.tick().unwrap(), false);

    assert!(powers(&wheels).iter().all(|p| (*p - 1.0).abs() < 1e-9), "{:?}", powers(&wheels));
    assert_eq!(intake.borrow().power(), 1.0);
    assert!((flywheel.borrow().power() - AUTO_FAR_SHOT_TPS / 2800.0).abs() < 1e-12);
    assert_eq!(feeder.borrow().power(), SHOOT_FEEDER_POWER);
    assert_eq!(agitator.borrow().power(), SHOOT_AGITATOR_POWER);

    // Letting go stops the mechanisms on the next tick
    pad.set(GamepadSnapshot::default());
    assert_eq!(controller.tick().unwrap(), false);
    assert!(powers(&wheels).iter().all(|p| *p == 0.0));
    assert!(mech.iter().all(|a| a.borrow().power() == 0.0));

    // Replacing the stack tears the old one down, stopping a running shooter
    pad.set(GamepadSnapshot {
        left_bumper: true,
        left_trigger: 1.0,
        ..Default::default()
    });
    controller.tick().unwrap();
    assert!(flywheel.borrow().power() > 0.0);
    assert_eq!(intake.borrow().power(), 1.0);

    controller
        .setup(
            Collaborators::new(HardwareMap::new()),
            vec![Box::new(WinLayer::new())],
        )
        .unwrap();
    assert!(mech.iter().all(|a| a.borrow().power() == 0.0));
}
