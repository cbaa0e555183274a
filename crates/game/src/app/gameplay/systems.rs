#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameplaySystemId {
    InputSampling,
    Locomotion,
    PhysicsStep,
    LookUpdate,
    CameraCompose,
    DialogExpiry,
    TriggerEvaluation,
}

impl GameplaySystemId {
    #[cfg(test)]
    fn name(self) -> &'static str {
        match self {
            Self::InputSampling => "InputSampling",
            Self::Locomotion => "Locomotion",
            Self::PhysicsStep => "PhysicsStep",
            Self::LookUpdate => "LookUpdate",
            Self::CameraCompose => "CameraCompose",
            Self::DialogExpiry => "DialogExpiry",
            Self::TriggerEvaluation => "TriggerEvaluation",
        }
    }
}

const GAMEPLAY_SYSTEM_ORDER: [GameplaySystemId; 7] = [
    GameplaySystemId::InputSampling,
    GameplaySystemId::Locomotion,
    GameplaySystemId::PhysicsStep,
    GameplaySystemId::LookUpdate,
    GameplaySystemId::CameraCompose,
    GameplaySystemId::DialogExpiry,
    GameplaySystemId::TriggerEvaluation,
];

struct GameplaySystemContext<'a, P: PhysicsWorld> {
    fixed_dt_seconds: f32,
    input: &'a InputSnapshot,
    tuning: &'a GameplayTuning,
    player: &'a mut PlayerState,
    physics: &'a mut P,
    camera_rig: &'a mut Box<dyn CameraRig>,
    dialogs: &'a mut DialogQueue,
    triggers: &'a mut TriggerRegistry,
    trigger_events: &'a mut Vec<TriggerEvent>,
}

#[derive(Default)]
struct GameplaySystemsHost {
    last_tick_order: Vec<GameplaySystemId>,
}

impl GameplaySystemsHost {
    fn run_once_per_tick<P: PhysicsWorld>(&mut self, context: &mut GameplaySystemContext<'_, P>) {
        self.last_tick_order.clear();
        context.trigger_events.clear();
        for system_id in GAMEPLAY_SYSTEM_ORDER {
            self.last_tick_order.push(system_id);
            Self::run_system(system_id, context);
        }
    }

    fn run_system<P: PhysicsWorld>(
        system_id: GameplaySystemId,
        context: &mut GameplaySystemContext<'_, P>,
    ) {
        match system_id {
            GameplaySystemId::InputSampling => Self::input_sampling_system(context),
            GameplaySystemId::Locomotion => {
                apply_locomotion(context.player, context.physics, context.input, context.tuning);
            }
            GameplaySystemId::PhysicsStep => Self::physics_step_system(context),
            GameplaySystemId::LookUpdate => Self::look_update_system(context),
            GameplaySystemId::CameraCompose => Self::camera_compose_system(context),
            GameplaySystemId::DialogExpiry => context.dialogs.tick(context.fixed_dt_seconds),
            GameplaySystemId::TriggerEvaluation => Self::trigger_evaluation_system(context),
        }
    }

    /// Applies last tick's teleport request.
    fn input_sampling_system<P: PhysicsWorld>(context: &mut GameplaySystemContext<'_, P>) {
        let Some(body) = context.player.body else {
            context.player.pending_teleport = None;
            return;
        };

        if let Some(target) = context.player.pending_teleport.take() {
            context.physics.set_position(body.handle, target);
            context.physics.set_linear_velocity(body.handle, Vec3::ZERO);
            context.camera_rig.reset();
            info!(x = target.x, y = target.y, z = target.z, "player_teleported");
        }
    }

    fn physics_step_system<P: PhysicsWorld>(context: &mut GameplaySystemContext<'_, P>) {
        context.physics.step(context.fixed_dt_seconds);
        context.player.position = context
            .player
            .body
            .and_then(|body| context.physics.position(body.handle));
    }

    /// Runs after locomotion, so movement this tick follows last tick's yaw.
    fn look_update_system<P: PhysicsWorld>(context: &mut GameplaySystemContext<'_, P>) {
        if context.player.body.is_none() || !context.input.pointer_locked() {
            return;
        }
        context
            .player
            .look
            .apply_pointer_delta(context.input.pointer_delta(), context.tuning.look_sensitivity);
    }

    fn camera_compose_system<P: PhysicsWorld>(context: &mut GameplaySystemContext<'_, P>) {
        let Some(position) = context.player.position else {
            return;
        };
        context.player.camera = Some(context.camera_rig.compose(
            position,
            &context.player.look,
            context.input,
            context.fixed_dt_seconds,
        ));
    }

    fn trigger_evaluation_system<P: PhysicsWorld>(context: &mut GameplaySystemContext<'_, P>) {
        let Some(position) = context.player.position else {
            return;
        };
        let events = context.triggers.evaluate(
            position,
            context.dialogs,
            &mut context.player.pending_teleport,
        );
        context.trigger_events.extend(events);
    }
}
