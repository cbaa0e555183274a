/// Inclusive axis-aligned bounds. Corner order does not matter.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RegionBounds {
    min: Vec3,
    max: Vec3,
}

impl RegionBounds {
    fn from_corners(corner_a: Vec3, corner_b: Vec3) -> Self {
        Self {
            min: corner_a.min(corner_b),
            max: corner_a.max(corner_b),
        }
    }

    fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

/// Handed to trigger callbacks; the only way a callback affects the session.
struct TriggerContext<'a> {
    trigger_id: &'a str,
    dialogs: &'a mut DialogQueue,
    pending_teleport: &'a mut Option<Vec3>,
}

impl TriggerContext<'_> {
    fn trigger_id(&self) -> &str {
        self.trigger_id
    }

    fn show_dialog(
        &mut self,
        text: impl Into<String>,
        duration_seconds: Option<f32>,
    ) -> Result<(), TriggerError> {
        if let Some(duration) = duration_seconds {
            if !(duration.is_finite() && duration > 0.0) {
                return Err(TriggerError::InvalidDialogDuration(duration));
            }
        }
        self.dialogs.push(text, duration_seconds);
        Ok(())
    }

    /// Applied at the start of the next tick. The latest request wins.
    fn request_teleport(&mut self, to: Vec3) -> Result<(), TriggerError> {
        if !to.is_finite() {
            return Err(TriggerError::InvalidTeleportTarget(to));
        }
        *self.pending_teleport = Some(to);
        Ok(())
    }
}

struct TriggerRegion {
    name: String,
    bounds: RegionBounds,
    mode: TriggerMode,
    active: bool,
    enter_count: u32,
    exit_count: u32,
    on_enter: TriggerCallback,
    on_exit: Option<TriggerCallback>,
}

impl TriggerRegion {
    fn should_fire_enter(&self) -> bool {
        match self.mode {
            TriggerMode::EveryEntry => true,
            TriggerMode::Once => self.enter_count == 0,
        }
    }

    fn should_fire_exit(&self) -> bool {
        match self.mode {
            TriggerMode::EveryEntry => true,
            TriggerMode::Once => self.exit_count == 0,
        }
    }
}

/// Arena of trigger regions, evaluated in insertion order.
#[derive(Default)]
struct TriggerRegistry {
    regions: Vec<TriggerRegion>,
    ids_by_name: HashMap<String, TriggerId>,
}

impl TriggerRegistry {
    fn register(
        &mut self,
        name: impl Into<String>,
        corner_a: Vec3,
        corner_b: Vec3,
        mode: TriggerMode,
        on_enter: TriggerCallback,
    ) -> Result<TriggerId, TriggerError> {
        let name = name.into();
        if self.lookup(&name).is_some() {
            return Err(TriggerError::DuplicateId(name));
        }
        let id = TriggerId(self.regions.len());
        self.ids_by_name.insert(name.clone(), id);
        self.regions.push(TriggerRegion {
            name,
            bounds: RegionBounds::from_corners(corner_a, corner_b),
            mode,
            active: false,
            enter_count: 0,
            exit_count: 0,
            on_enter,
            on_exit: None,
        });
        Ok(id)
    }

    /// Returns false when `id` is unknown.
    fn set_exit_callback(&mut self, id: TriggerId, on_exit: TriggerCallback) -> bool {
        match self.regions.get_mut(id.0) {
            Some(region) => {
                region.on_exit = Some(on_exit);
                true
            }
            None => false,
        }
    }

    fn register_from_def(&mut self, def: &TriggerDef) -> Result<TriggerId, TriggerError> {
        let (corner_a, corner_b) = def.corners();
        let id = self.register(
            def.id.clone(),
            corner_a,
            corner_b,
            def.mode.into(),
            callback_for_action(&def.on_enter),
        )?;
        if let Some(on_exit) = &def.on_exit {
            self.set_exit_callback(id, callback_for_action(on_exit));
        }
        Ok(id)
    }

    fn lookup(&self, name: &str) -> Option<TriggerId> {
        self.ids_by_name.get(name).copied()
    }

    fn len(&self) -> usize {
        self.regions.len()
    }

    fn clear(&mut self) {
        self.regions.clear();
        self.ids_by_name.clear();
    }

    #[cfg(test)]
    fn is_active(&self, id: TriggerId) -> bool {
        self.regions.get(id.0).is_some_and(|region| region.active)
    }

    #[cfg(test)]
    fn enter_count(&self, id: TriggerId) -> u32 {
        self.regions.get(id.0).map_or(0, |region| region.enter_count)
    }

    fn bounds(&self) -> impl Iterator<Item = RegionBounds> + '_ {
        self.regions.iter().map(|region| region.bounds)
    }

    /// Edge-detects membership for every region and runs the matching
    /// callbacks. The active flag is committed before a callback runs, so a
    /// failing callback never leaves a region half-transitioned.
    fn evaluate(
        &mut self,
        position: Vec3,
        dialogs: &mut DialogQueue,
        pending_teleport: &mut Option<Vec3>,
    ) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        for (index, region) in self.regions.iter_mut().enumerate() {
            let inside = region.bounds.contains(position);
            if inside == region.active {
                continue;
            }
            region.active = inside;

            let id = TriggerId(index);
            let (edge, fire) = if inside {
                (TriggerEdge::Entered, region.should_fire_enter())
            } else {
                (TriggerEdge::Exited, region.should_fire_exit())
            };
            if !fire {
                continue;
            }

            let callback = match edge {
                TriggerEdge::Entered => {
                    region.enter_count = region.enter_count.saturating_add(1);
                    info!(trigger = %region.name, entries = region.enter_count, "trigger_entered");
                    Some(&mut region.on_enter)
                }
                TriggerEdge::Exited => {
                    region.exit_count = region.exit_count.saturating_add(1);
                    info!(trigger = %region.name, "trigger_exited");
                    region.on_exit.as_mut()
                }
            };
            events.push(TriggerEvent { id, edge });

            if let Some(callback) = callback {
                let mut context = TriggerContext {
                    trigger_id: &region.name,
                    dialogs: &mut *dialogs,
                    pending_teleport: &mut *pending_teleport,
                };
                if let Err(error) = callback(&mut context) {
                    warn!(
                        trigger = %region.name,
                        edge = ?edge,
                        error = %error,
                        "trigger_callback_failed"
                    );
                }
            }
        }
        events
    }
}

fn callback_for_action(action: &TriggerActionDef) -> TriggerCallback {
    match action.clone() {
        TriggerActionDef::ShowDialog {
            text,
            duration_seconds,
        } => Box::new(move |context: &mut TriggerContext<'_>| {
            debug!(trigger = context.trigger_id(), "trigger_dialog");
            context.show_dialog(text.clone(), duration_seconds)
        }),
        TriggerActionDef::Teleport { to } => {
            let to = Vec3::from_array(to);
            Box::new(move |context: &mut TriggerContext<'_>| context.request_teleport(to))
        }
    }
}
