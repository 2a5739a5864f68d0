// Player interaction driver.
//
// `VrPlayer` is what the engine's frame loop talks to: it turns analog
// button values into press/release edges and dispatches to the teleport,
// grab and crosshair systems in tick order.

use crate::crosshair::CrosshairSystem;
use crate::grab::GrabSystem;
use crate::input_context::{AimPose, InputContext};
use crate::input_log;
use crate::physics::{ObjectHandle, PlayerBody, RigidObjects, SpatialQuery};
use crate::teleport::TeleportSystem;
use crate::time::Time;
use crate::vr_config::VrConfig;

pub struct VrPlayer {
    teleport: TeleportSystem,
    grab: GrabSystem,
    crosshair: CrosshairSystem,
    trigger_threshold: f32,
    teleport_was_pressed: bool,
    grab_was_pressed: bool,
    /// Bodies representing the player's tracked hands; every overlap and
    /// sweep query skips these.
    hand_exclusions: Vec<ObjectHandle>,
}

impl VrPlayer {
    pub fn new(config: VrConfig) -> Self {
        VrPlayer {
            teleport: TeleportSystem::new(config.teleport),
            grab: GrabSystem::new(config.grab),
            crosshair: CrosshairSystem::new(config.crosshair),
            trigger_threshold: config.trigger_threshold,
            teleport_was_pressed: false,
            grab_was_pressed: false,
            hand_exclusions: Vec::new(),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(VrConfig::default())
    }

    pub fn set_hand_exclusions(&mut self, exclusions: Vec<ObjectHandle>) {
        self.hand_exclusions = exclusions;
    }

    pub fn teleport(&self) -> &TeleportSystem {
        &self.teleport
    }

    pub fn grab(&self) -> &GrabSystem {
        &self.grab
    }

    pub fn crosshair(&self) -> &CrosshairSystem {
        &self.crosshair
    }

    /// One simulation tick: edge-detect inputs, then update every
    /// subsystem against the shared world.
    pub fn update<W: SpatialQuery + RigidObjects + PlayerBody>(
        &mut self,
        time: &Time,
        input: &InputContext,
        world: &mut W,
    ) {
        let aim = AimPose::from_pose(&input.aim.pose());
        let hand = input.hand.pose();
        let dt = time.elapsed.as_secs_f32();

        let teleport_pressed = input.aim.trigger_value >= self.trigger_threshold;
        if teleport_pressed && !self.teleport_was_pressed {
            input_log!(trace, "teleport aim pressed");
            self.teleport.start(world);
        }
        if !teleport_pressed && self.teleport_was_pressed {
            input_log!(trace, "teleport aim released");
            self.teleport.finish(world);
        }
        self.teleport_was_pressed = teleport_pressed;

        let grab_pressed = input.hand.grip_value >= self.trigger_threshold;
        if grab_pressed && !self.grab_was_pressed {
            self.grab
                .try_grab(&hand, &aim, world, &self.hand_exclusions);
        }
        if !grab_pressed && self.grab_was_pressed {
            self.grab.try_ungrab(dt, world);
        }
        self.grab_was_pressed = grab_pressed;

        self.teleport.update(time, &aim, world);
        self.grab.update(time, &hand, world);
        self.crosshair.update(&aim, input.head.position, world);
    }
}
