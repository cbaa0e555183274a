pub(crate) struct GameplayScene<P: PhysicsWorld> {
    level: LevelDef,
    tuning: GameplayTuning,
    physics: P,
    player: PlayerState,
    camera_rig: Box<dyn CameraRig>,
    dialogs: DialogQueue,
    triggers: TriggerRegistry,
    systems_host: GameplaySystemsHost,
    trigger_events: Vec<TriggerEvent>,
    tick_count: u64,
}

impl<P: PhysicsWorld> GameplayScene<P> {
    /// Static level geometry goes into `physics` here, once per scene.
    pub(crate) fn new(level: LevelDef, tuning: GameplayTuning, mut physics: P) -> Self {
        for def in &level.static_boxes {
            physics.add_static_box(def.center(), def.half_extents());
        }
        Self {
            player: PlayerState::new(level.player_spawn_yaw),
            camera_rig: camera_rig_for(&tuning),
            dialogs: DialogQueue::new(tuning.dialog_duration_seconds),
            triggers: TriggerRegistry::default(),
            systems_host: GameplaySystemsHost::default(),
            trigger_events: Vec::new(),
            tick_count: 0,
            level,
            tuning,
            physics,
        }
    }

    fn spawn_player(&mut self) -> PlayerBody {
        let shape = BodyShape::Ball {
            radius: PLAYER_BALL_RADIUS,
        };
        let handle = self.physics.spawn_dynamic_body(&DynamicBodyDesc {
            position: self.level.player_spawn(),
            rotation: Quat::from_rotation_y(PI),
            shape,
            mass: PLAYER_MASS,
            lock_rotations: true,
        });
        let body = PlayerBody { handle, shape };
        debug!(
            body = handle.0,
            mass = PLAYER_MASS,
            half_height = body.half_height(),
            "player_spawned"
        );
        body
    }

    fn register_level_triggers(&mut self) {
        for def in &self.level.triggers {
            if let Err(error) = self.triggers.register_from_def(def) {
                warn!(trigger = %def.id, error = %error, "trigger_register_failed");
            }
        }
    }

    fn push_static_lines(&self, world: &mut SceneWorld) {
        world.clear_lines();
        if let Some(height) = highest_floor_top(&self.level) {
            let spawn = self.level.player_spawn();
            world.push_ground_grid(
                Vec3::new(spawn.x, height, spawn.z),
                GROUND_GRID_HALF_EXTENT,
                GROUND_GRID_SPACING,
                GROUND_GRID_COLOR,
            );
        }
        for def in &self.level.static_boxes {
            let center = def.center();
            let half_extents = def.half_extents();
            world.push_box_wireframe(center - half_extents, center + half_extents, STATIC_BOX_COLOR);
        }
        for bounds in self.triggers.bounds() {
            world.push_box_wireframe(bounds.min, bounds.max, TRIGGER_VOLUME_COLOR);
        }
    }

    fn publish_camera(&self, world: &mut SceneWorld) {
        if let Some(pose) = self.player.camera {
            world.set_camera(Camera3D {
                position: pose.position,
                orientation: pose.orientation,
                vertical_fov_radians: self.tuning.vertical_fov_radians(),
            });
        }
    }

    pub(crate) fn dialog_directive(&self) -> Option<DialogDirective> {
        self.dialogs.directive()
    }
}

impl<P: PhysicsWorld> Scene for GameplayScene<P> {
    fn load(&mut self, world: &mut SceneWorld) {
        self.triggers.clear();
        self.register_level_triggers();
        self.dialogs.clear();
        self.player = PlayerState::new(self.level.player_spawn_yaw);
        self.camera_rig.reset();
        let body = self.spawn_player();
        self.player.body = Some(body);
        self.player.position = self.physics.position(body.handle);
        if let Some(position) = self.player.position {
            self.player.camera = Some(self.camera_rig.compose(
                position,
                &self.player.look,
                &InputSnapshot::empty(),
                0.0,
            ));
        }
        self.tick_count = 0;

        world.set_clear_color(SKY_CLEAR_COLOR);
        self.push_static_lines(world);
        self.publish_camera(world);
        world.set_dialog(None);
        info!(
            level = %self.level.name,
            static_boxes = self.level.static_boxes.len(),
            triggers = self.triggers.len(),
            camera = self.camera_rig.name(),
            sys = GAMEPLAY_SYSTEM_ORDER_TEXT,
            "scene_loaded"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }

        let mut context = GameplaySystemContext {
            fixed_dt_seconds,
            input,
            tuning: &self.tuning,
            player: &mut self.player,
            physics: &mut self.physics,
            camera_rig: &mut self.camera_rig,
            dialogs: &mut self.dialogs,
            triggers: &mut self.triggers,
            trigger_events: &mut self.trigger_events,
        };
        self.systems_host.run_once_per_tick(&mut context);
        self.tick_count = self.tick_count.saturating_add(1);
        for event in &self.trigger_events {
            debug!(
                trigger = event.id.0,
                edge = ?event.edge,
                tick = self.tick_count,
                "trigger_event"
            );
        }

        self.publish_camera(world);
        world.set_dialog(self.dialog_directive());
        SceneCommand::None
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        if let Some(body) = self.player.body.take() {
            self.physics.remove_body(body.handle);
        }
        self.player.position = None;
        self.player.pending_teleport = None;
        self.dialogs.clear();
        world.clear_lines();
        world.set_dialog(None);
        info!(
            level = %self.level.name,
            ticks = self.tick_count,
            "scene_unloaded"
        );
    }

    fn debug_title(&self) -> Option<String> {
        let dialog = self.dialog_directive();
        Some(hud_title(
            &self.level.name,
            self.player.position,
            dialog.as_ref().map(|directive| directive.text.as_str()),
        ))
    }
}
