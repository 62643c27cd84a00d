//! The command interface: every mutation a host may request.
//!
//! Commands run between ticks, never during one, so a tick always sees a
//! settled state. Refusals (insufficient resources, locked content, wrong
//! era) are ordinary outcomes and come back as `false`; only the save
//! operations can fail with an error.

use tracing::{info, warn};

use kindling_ledger::{CostMap, Quantity};
use kindling_settlement::{Economy, production};
use kindling_types::{
    BuildingKind, Era, Job, ManualAction, ResourceKind, SocialClass, TechKind, TemporaryEffect,
    TemporaryEffectKind, WorldEventKind,
};

use crate::chronicle::ChronicleEvent;
use crate::game::Game;
use crate::persistence::{self, SaveError};
use crate::state::{GameState, SPEEDS};

/// Mutations a host can apply to a game.
pub trait Commands {
    /// Add to a resource, clamped to its cap. Returns the amount stored.
    fn add_resource(&mut self, kind: ResourceKind, amount: Quantity) -> Quantity;

    /// Remove from a resource, clamped at zero. Returns the amount removed.
    fn remove_resource(&mut self, kind: ResourceKind, amount: Quantity) -> Quantity;

    /// Remove a whole batch only if every entry is covered.
    fn remove_resources(&mut self, batch: &CostMap) -> bool;

    /// Perform a hands-on action. Returns the amount stored.
    fn perform(&mut self, action: ManualAction) -> Quantity;

    /// Spend wood to refuel the bonfire.
    fn stoke_bonfire(&mut self) -> bool;

    /// Build one unit of `kind`.
    fn build(&mut self, kind: BuildingKind) -> bool;

    /// Research `kind`. Researching a known tech is a refused no-op.
    fn research(&mut self, kind: TechKind) -> bool;

    /// Move one idle settler into `job`.
    fn assign_worker(&mut self, job: Job) -> bool;

    /// Move one settler out of `job`.
    fn remove_worker(&mut self, job: Job) -> bool;

    /// Move one idle settler into `class`.
    fn assign_social_class(&mut self, class: SocialClass) -> bool;

    /// Move one settler out of `class`.
    fn remove_social_class(&mut self, class: SocialClass) -> bool;

    /// Request a tax rate. Returns the rate applied after snapping.
    fn set_tax_rate(&mut self, rate: Quantity) -> Quantity;

    /// Pay gold and food for a temporary happiness boost.
    fn hold_festival(&mut self) -> bool;

    /// Turn automatic bonfire refuelling on or off.
    fn set_auto_refuel(&mut self, enabled: bool);

    /// Start the scheduler.
    fn start_game(&mut self);

    /// Flip between running and paused. Returns the new running flag.
    fn toggle_game(&mut self) -> bool;

    /// Set the speed factor. Only values in [`SPEEDS`] are accepted.
    fn set_game_speed(&mut self, speed: u32) -> bool;

    /// Enter the kingdom era once the tribal wonder stands.
    fn advance_to_era2(&mut self) -> bool;

    /// Encode the current state as transport text.
    fn export_save(&self) -> Result<String, SaveError>;

    /// Replace the current state with a decoded save.
    ///
    /// On any failure the current state is left untouched.
    fn import_save(&mut self, text: &str) -> Result<(), SaveError>;

    /// Discard the current state and start over.
    fn reset_save(&mut self);
}

impl Commands for Game {
    fn add_resource(&mut self, kind: ResourceKind, amount: Quantity) -> Quantity {
        self.state.resources.add(kind, amount)
    }

    fn remove_resource(&mut self, kind: ResourceKind, amount: Quantity) -> Quantity {
        self.state.resources.remove(kind, amount)
    }

    fn remove_resources(&mut self, batch: &CostMap) -> bool {
        self.state.resources.try_spend(batch)
    }

    fn perform(&mut self, action: ManualAction) -> Quantity {
        let (kind, amount) =
            production::manual_output(action, &self.state.techs, &self.config.production);
        self.state.resources.add(kind, amount)
    }

    fn stoke_bonfire(&mut self) -> bool {
        self.state
            .bonfire
            .stoke(&mut self.state.resources, &self.config.bonfire)
    }

    fn build(&mut self, kind: BuildingKind) -> bool {
        let unlocked = self.state.techs.building_unlocked(kind);
        let outcome = match self.state.buildings.try_build(
            kind,
            &mut self.state.resources,
            self.state.era,
            unlocked,
        ) {
            Ok(outcome) => outcome,
            Err(refusal) => {
                info!(?kind, ?refusal, "Build refused");
                return false;
            }
        };

        self.state.refresh_caps(&self.config);
        self.note(&ChronicleEvent::Built(kind));
        if outcome.completes_era && !self.state.era_completed {
            self.state.era_completed = true;
            info!(tick = self.state.tick, era = ?self.state.era, "Era completed");
            self.note(&ChronicleEvent::EraCompleted(self.state.era));
        }
        true
    }

    fn research(&mut self, kind: TechKind) -> bool {
        match self
            .state
            .techs
            .research(kind, &mut self.state.resources, self.state.era)
        {
            Ok(_) => {
                self.note(&ChronicleEvent::Researched(kind));
                true
            }
            Err(refusal) => {
                info!(?kind, ?refusal, "Research refused");
                false
            }
        }
    }

    fn assign_worker(&mut self, job: Job) -> bool {
        if self.state.era != Era::Tribal || !self.state.techs.job_unlocked(job) {
            return false;
        }
        let total = self.state.settlers();
        self.state.workforce.assign_job(job, 1, total) == 1
    }

    fn remove_worker(&mut self, job: Job) -> bool {
        self.state.workforce.remove_job(job, 1) == 1
    }

    fn assign_social_class(&mut self, class: SocialClass) -> bool {
        if self.state.era != Era::Kingdom {
            return false;
        }
        let total = self.state.settlers();
        self.state.workforce.assign_class(class, 1, total) == 1
    }

    fn remove_social_class(&mut self, class: SocialClass) -> bool {
        self.state.workforce.remove_class(class, 1) == 1
    }

    fn set_tax_rate(&mut self, rate: Quantity) -> Quantity {
        self.state.economy.set_tax_rate(rate, &self.config.economy)
    }

    fn hold_festival(&mut self) -> bool {
        if self.state.era != Era::Kingdom {
            return false;
        }
        let economy = &self.config.economy;
        let price = CostMap::from([
            (ResourceKind::Gold, economy.festival_gold),
            (ResourceKind::Food, economy.festival_food),
        ]);
        if !self.state.resources.try_spend(&price) {
            return false;
        }
        self.state.temporary_effects.push(TemporaryEffect {
            kind: TemporaryEffectKind::Happiness,
            magnitude: economy.festival_happiness,
            expires_at_tick: self
                .state
                .tick
                .saturating_add(economy.festival_duration_ticks),
            source: WorldEventKind::Festival,
        });
        info!(tick = self.state.tick, "Festival held");
        self.note(&ChronicleEvent::FestivalHeld);
        true
    }

    fn set_auto_refuel(&mut self, enabled: bool) {
        self.state.bonfire.set_auto_refuel(enabled);
    }

    fn start_game(&mut self) {
        if !self.state.running {
            self.state.running = true;
            info!(tick = self.state.tick, "Game started");
        }
    }

    fn toggle_game(&mut self) -> bool {
        self.state.running = !self.state.running;
        info!(tick = self.state.tick, running = self.state.running, "Game toggled");
        self.state.running
    }

    fn set_game_speed(&mut self, speed: u32) -> bool {
        if !SPEEDS.contains(&speed) {
            return false;
        }
        self.state.speed = speed;
        true
    }

    fn advance_to_era2(&mut self) -> bool {
        if self.state.era != Era::Tribal || !self.state.era_completed {
            return false;
        }
        self.state.era = Era::Kingdom;
        self.state.era_completed = false;
        self.state.workforce.clear_jobs();
        self.state.economy = Economy::new(&self.config.economy);
        self.state.refresh_caps(&self.config);
        info!(tick = self.state.tick, "Advanced to the kingdom era");
        self.note(&ChronicleEvent::EraAdvanced(Era::Kingdom));
        true
    }

    fn export_save(&self) -> Result<String, SaveError> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        persistence::export(&self.state, timestamp)
    }

    fn import_save(&mut self, text: &str) -> Result<(), SaveError> {
        let template = GameState::new(&self.config);
        let loaded = match persistence::import(text, &template) {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(%error, "Save import failed; keeping current state");
                return Err(error);
            }
        };
        self.state = loaded.state;
        self.state.refresh_caps(&self.config);
        self.reseed();
        info!(
            tick = self.state.tick,
            saved_at = loaded.timestamp,
            "Save imported"
        );
        Ok(())
    }

    fn reset_save(&mut self) {
        self.state = GameState::new(&self.config);
        self.reseed();
        info!("Save reset");
    }
}
