//! Game session management.
//!
//! `GameSession` owns the whole run: the dungeon, the player, the stair
//! prompt, the dice, both collaborators, and the journal. Every player
//! command goes through it, one at a time. It is the only place where the
//! validator, the check resolver, and the impact applicator are wired
//! together.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use dv_core::{
    Attributes, Direction, Dungeon, GameSnapshot, Player, Position, Quest, Room, SaveFile,
    StairDirection, generate::generate,
};
use dv_mechanics::{
    ActionIntent, AppliedDelta, HazardOutcome, ImpactReport, RejectionReason, ResolutionOutcome,
    RollSource, StrikeOutcome, ValidationResult, apply_impact, monster_strike, provokes,
    resolve_check, spring_hazard, validate,
};

use crate::collaborator::{
    Guarded, IntentExtractor, IntentRequest, KeywordInterpreter, NarrationRequest, Narrator,
    PlayerView, RoomView, TemplateNarrator,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::journal::{Journal, JournalEntry};
use crate::stairs::StairMachine;

/// How the run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The run is in progress.
    Playing,
    /// The boss has fallen.
    Victory,
    /// The player has died.
    Defeated,
}

impl RunStatus {
    /// Whether the run has ended.
    pub fn is_over(self) -> bool {
        self != Self::Playing
    }
}

/// Result of a successful move.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    /// The room entered.
    pub room: Room,
    /// Whether a stair prompt is now open.
    pub transition_pending: bool,
    /// Which way the stairs lead, if a prompt is open.
    pub direction: Option<StairDirection>,
    /// The hazard that sprang on entry, if one was armed.
    pub hazard: Option<HazardOutcome>,
}

/// Result of answering a stair prompt.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// Whether the stairs were taken.
    pub accepted: bool,
    /// The level the player is on afterwards.
    pub new_z: usize,
    /// The room the player stands in afterwards.
    pub room: Room,
}

/// Everything that happened while resolving one free-text action.
#[derive(Debug, Clone)]
pub struct ActionReport {
    /// The interpreted intent.
    pub intent: ActionIntent,
    /// The validator's verdict. A rejection discovered while applying the
    /// impact is reported here too.
    pub validation: ValidationResult,
    /// The check, if one was rolled.
    pub outcome: Option<ResolutionOutcome>,
    /// The applied changes, if the impact went through.
    pub impact: Option<ImpactReport>,
    /// Display text.
    pub narration: String,
    /// Whether the interpreter failed and the keyword fallback intent was used.
    pub used_fallback: bool,
    /// The room's monster striking back, if it was provoked.
    pub retaliation: Option<StrikeOutcome>,
}

/// An interactive dungeon run.
pub struct GameSession {
    config: EngineConfig,
    dungeon: Dungeon,
    player: Player,
    stairs: StairMachine,
    rolls: Box<dyn RollSource + Send>,
    interpreter: Guarded<dyn IntentExtractor>,
    narrator: Guarded<dyn Narrator>,
    journal: Journal,
    turn: u64,
    status: RunStatus,
}

impl GameSession {
    /// Generate a fresh dungeon from the configured seed and start a run
    /// with the offline collaborators.
    pub fn new(config: EngineConfig, player: Player) -> EngineResult<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let dungeon = generate(&config.dungeon, &mut rng)?;

        let mut player = player;
        player.position = Position::origin();
        let boss_name = dungeon
            .boss()
            .map_or_else(|| "the dungeon's master".to_string(), |b| b.name.clone());
        player.quests.add(Quest::slay_boss(&boss_name));

        let mut session = Self::assemble(config, dungeon, player, rng);
        session.journal.append(JournalEntry::RunStarted {
            player: session.player.name.clone(),
            seed: session.config.seed,
            timestamp: Utc::now(),
        });
        session.enter_current_room(false)?;
        info!(
            player = %session.player.name,
            seed = session.config.seed,
            "run started"
        );
        Ok(session)
    }

    /// Start a run on a prepared dungeon and player.
    pub fn from_parts(config: EngineConfig, dungeon: Dungeon, player: Player) -> EngineResult<Self> {
        config.validate()?;
        let snapshot = GameSnapshot {
            dungeon,
            player,
            pending_stairs: None,
            turn: 0,
            victory: false,
        };
        snapshot.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        let mut session = Self::assemble(config, snapshot.dungeon, snapshot.player, rng);
        session.enter_current_room(false)?;
        Ok(session)
    }

    fn assemble(config: EngineConfig, dungeon: Dungeon, player: Player, rng: StdRng) -> Self {
        let timeout = Duration::from_millis(config.collaborator_timeout_ms);
        let interpreter: Arc<dyn IntentExtractor> = Arc::new(KeywordInterpreter::new());
        let narrator: Arc<dyn Narrator> = Arc::new(TemplateNarrator::default());
        let status = if player.is_dead() {
            RunStatus::Defeated
        } else {
            RunStatus::Playing
        };
        Self {
            config,
            dungeon,
            player,
            stairs: StairMachine::new(),
            rolls: Box::new(rng),
            interpreter: Guarded::new(interpreter, timeout),
            narrator: Guarded::new(narrator, timeout),
            journal: Journal::new(),
            turn: 0,
            status,
        }
    }

    /// Replace the collaborators.
    pub fn with_collaborators(
        mut self,
        interpreter: Arc<dyn IntentExtractor>,
        narrator: Arc<dyn Narrator>,
    ) -> Self {
        let timeout = Duration::from_millis(self.config.collaborator_timeout_ms);
        self.interpreter = Guarded::new(interpreter, timeout);
        self.narrator = Guarded::new(narrator, timeout);
        self
    }

    /// Replace the dice.
    pub fn with_rolls(mut self, rolls: impl RollSource + Send + 'static) -> Self {
        self.rolls = Box::new(rolls);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The dungeon.
    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    /// The player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The room the player stands in.
    pub fn current_room(&self) -> EngineResult<&Room> {
        Ok(self.dungeon.get_room(self.player.position)?)
    }

    /// The open stair prompt, if any.
    pub fn pending_transition(&self) -> Option<StairDirection> {
        self.stairs.pending()
    }

    /// The run journal.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Turns taken so far.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// How the run stands.
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Capture the persistent state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            dungeon: self.dungeon.clone(),
            player: self.player.clone(),
            pending_stairs: self.stairs.pending(),
            turn: self.turn,
            victory: self.status == RunStatus::Victory,
        }
    }

    /// Replace the persistent state with a checked snapshot.
    pub fn restore(&mut self, snapshot: GameSnapshot) -> EngineResult<()> {
        snapshot.validate()?;
        self.status = if snapshot.victory {
            RunStatus::Victory
        } else if snapshot.player.is_dead() {
            RunStatus::Defeated
        } else {
            RunStatus::Playing
        };
        self.stairs = StairMachine::with_pending(snapshot.pending_stairs);
        self.turn = snapshot.turn;
        self.dungeon = snapshot.dungeon;
        self.player = snapshot.player;
        Ok(())
    }

    /// Write a sealed save file.
    pub fn save(&mut self, path: &Path) -> EngineResult<()> {
        let json = SaveFile::seal(self.snapshot())?.to_json()?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), turn = self.turn, "game saved");
        self.journal.append(JournalEntry::Saved {
            path: path.display().to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Load a save file. On any failure the current state is left untouched.
    pub fn load(&mut self, path: &Path) -> EngineResult<()> {
        let text = std::fs::read_to_string(path)?;
        let snapshot = SaveFile::open(&text).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "save file rejected");
        })?;
        self.restore(snapshot)?;
        info!(path = %path.display(), turn = self.turn, "game loaded");
        self.journal.append(JournalEntry::Loaded {
            path: path.display().to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    // -- Movement -----------------------------------------------------------

    /// Walk to the neighbouring room.
    ///
    /// An armed hazard in the new room springs first and may end the run.
    /// Entering a stair room opens a prompt; nothing changes level until
    /// [`confirm_transition`](Self::confirm_transition) accepts it.
    pub fn attempt_move(&mut self, direction: Direction) -> EngineResult<MoveOutcome> {
        self.ensure_playing()?;
        self.drop_pending()?;

        let from = self.player.position;
        let to = self
            .dungeon
            .neighbor(from, direction)
            .ok_or(EngineError::NoExit { direction })?;
        self.player.position = to;
        self.turn += 1;
        debug!(%from, %to, "moved");
        self.journal.append(JournalEntry::Moved {
            from,
            to,
            timestamp: Utc::now(),
        });

        self.enter_current_room(false)?;
        let hazard = self.spring_hazard_here()?;
        let room = self.current_room()?.clone();
        let pending = if self.status.is_over() {
            None
        } else {
            self.stairs.arrive(room.room_type)
        };
        if let Some(direction) = pending {
            info!(%direction, position = %to, "stair prompt opened");
        }
        Ok(MoveOutcome {
            room,
            transition_pending: pending.is_some(),
            direction: pending,
            hazard,
        })
    }

    fn spring_hazard_here(&mut self) -> EngineResult<Option<HazardOutcome>> {
        let position = self.player.position;
        let Some(hazard) = self
            .dungeon
            .get_room(position)?
            .armed_hazard()
            .map(str::to_string)
        else {
            return Ok(None);
        };
        let outcome = spring_hazard(
            &hazard,
            &mut self.player,
            &self.config.threats,
            self.rolls.as_mut(),
        );
        self.dungeon.get_room_mut(position)?.hazard_triggered = true;
        info!(%hazard, avoided = outcome.avoided, damage = outcome.damage, "hazard sprang");
        self.journal.append(JournalEntry::HazardSprung {
            hazard,
            avoided: outcome.avoided,
            damage: outcome.damage,
            timestamp: Utc::now(),
        });
        if self.player.is_dead() {
            self.end_run(RunStatus::Defeated);
        }
        Ok(Some(outcome))
    }

    /// Reopen the stair prompt while standing on stairs.
    pub fn offer_stairs(&mut self) -> EngineResult<StairDirection> {
        self.ensure_playing()?;
        if let Some(direction) = self.stairs.pending() {
            return Ok(direction);
        }
        let room_type = self.current_room()?.room_type;
        self.stairs
            .arrive(room_type)
            .ok_or(EngineError::NoPendingTransition)
    }

    /// Answer the open stair prompt.
    pub fn confirm_transition(&mut self, accept: bool) -> EngineResult<TransitionOutcome> {
        self.ensure_playing()?;
        let Some(direction) = self.stairs.pending() else {
            return Err(EngineError::NoPendingTransition);
        };

        if !accept {
            self.stairs.decline();
            self.journal.append(JournalEntry::StairsDeclined {
                direction,
                timestamp: Utc::now(),
            });
            return Ok(TransitionOutcome {
                accepted: false,
                new_z: self.player.position.z,
                room: self.current_room()?.clone(),
            });
        }

        let here = self.player.position;
        let new_z = match direction {
            StairDirection::Down => here.z + 1,
            StairDirection::Up => here.z.checked_sub(1).ok_or_else(|| {
                dv_core::CoreError::StateCorruption(format!("stairs up on the top level at {here}"))
            })?,
        };
        let target = Position::new(here.x, here.y, new_z);
        self.dungeon.get_room(target)?;

        self.stairs.confirm();
        self.player.position = target;
        self.turn += 1;
        info!(%direction, new_z, "took the stairs");
        self.journal.append(JournalEntry::StairsTaken {
            direction,
            new_z,
            timestamp: Utc::now(),
        });

        let room = self.enter_current_room(true)?;
        Ok(TransitionOutcome {
            accepted: true,
            new_z,
            room,
        })
    }

    // -- Free actions -------------------------------------------------------

    /// Interpret, validate, resolve, and apply one free-text action.
    ///
    /// A rejected action is not an error: it comes back as a report with no
    /// outcome, and nothing in the game state changes.
    pub fn resolve_free_action(&mut self, text: &str) -> EngineResult<ActionReport> {
        self.ensure_playing()?;
        self.drop_pending()?;

        let (intent, used_fallback) = self.interpret(text)?;
        let validation = validate(&intent, &self.player, self.current_room()?);
        if !validation.allowed {
            return Ok(self.rejected(text, intent, validation, None, used_fallback));
        }

        let outcome = resolve_check(&intent, &self.player, self.rolls.as_mut());
        let impact = match apply_impact(
            &self.config.impact,
            &self.config.progression,
            &intent,
            outcome.classification,
            &mut self.player,
            &mut self.dungeon,
        ) {
            Ok(impact) => impact,
            Err(reason) => {
                let validation = ValidationResult::reject(reason);
                return Ok(self.rejected(text, intent, validation, Some(outcome), used_fallback));
            }
        };

        self.turn += 1;
        for delta in &impact.deltas {
            if let AppliedDelta::LevelUp { level, max_hp } = delta {
                info!(level, max_hp, "level up");
            }
        }

        let narration = self.narrate(&NarrationRequest {
            action_type: intent.action_type,
            target: intent.target.clone(),
            method: intent.method.clone(),
            classification: Some(outcome.classification),
            margin: Some(outcome.margin),
            rejection: None,
            deltas: impact.deltas.clone(),
        });
        self.journal.append(JournalEntry::ActionResolved {
            text: text.to_string(),
            action_type: intent.action_type.to_string(),
            classification: outcome.classification.to_string(),
            roll: outcome.roll_value,
            total: outcome.total,
            difficulty: outcome.difficulty,
            narration: narration.clone(),
            timestamp: Utc::now(),
        });

        let retaliation = if impact.boss_defeated() || self.player.is_dead() {
            None
        } else {
            self.strike_back(&intent)?
        };

        if impact.boss_defeated() {
            self.end_run(RunStatus::Victory);
        } else if self.player.is_dead() {
            self.end_run(RunStatus::Defeated);
        }

        Ok(ActionReport {
            intent,
            validation,
            outcome: Some(outcome),
            impact: Some(impact),
            narration,
            used_fallback,
            retaliation,
        })
    }

    /// Let the room's monster answer a resolved action if it is on guard
    /// or was just attacked.
    fn strike_back(&mut self, intent: &ActionIntent) -> EngineResult<Option<StrikeOutcome>> {
        let Some(monster) = self.current_room()?.monster.clone() else {
            return Ok(None);
        };
        if !provokes(&monster, intent, &self.config.threats) {
            return Ok(None);
        }
        let outcome = monster_strike(
            &monster,
            &mut self.player,
            &self.config.threats,
            self.rolls.as_mut(),
        );
        debug!(monster = %monster.name, hit = outcome.hit, damage = outcome.damage, "monster struck back");
        self.journal.append(JournalEntry::MonsterStruck {
            monster: monster.name,
            hit: outcome.hit,
            damage: outcome.damage,
            timestamp: Utc::now(),
        });
        Ok(Some(outcome))
    }

    fn interpret(&mut self, text: &str) -> EngineResult<(ActionIntent, bool)> {
        let request = IntentRequest {
            action_text: text.to_string(),
            player: PlayerView::of(&self.player),
            room: RoomView::of(self.current_room()?),
        };
        let parsed = self
            .interpreter
            .extract(&request)
            .map_err(|e| e.to_string())
            .and_then(|raw| ActionIntent::from_json(&raw).map_err(|e| e.to_string()));

        Ok(match parsed {
            Ok(intent) => (intent, false),
            Err(cause) => {
                warn!(%cause, "interpreter failed, using fallback intent");
                self.journal.append(JournalEntry::CollaboratorFallback {
                    collaborator: "interpreter".to_string(),
                    cause,
                    timestamp: Utc::now(),
                });
                let intent = ActionIntent::fallback(text, self.config.fallback_plausibility);
                (intent, true)
            }
        })
    }

    fn rejected(
        &mut self,
        text: &str,
        intent: ActionIntent,
        validation: ValidationResult,
        outcome: Option<ResolutionOutcome>,
        used_fallback: bool,
    ) -> ActionReport {
        let reason = validation
            .reason
            .unwrap_or(RejectionReason::InterpreterRejected);
        debug!(reason = reason.code(), detail = ?validation.detail, "action rejected");
        let narration = self.narrate(&NarrationRequest {
            action_type: intent.action_type,
            target: intent.target.clone(),
            method: intent.method.clone(),
            classification: None,
            margin: None,
            rejection: Some(reason),
            deltas: Vec::new(),
        });
        self.journal.append(JournalEntry::ActionRejected {
            text: text.to_string(),
            reason: reason.code().to_string(),
            timestamp: Utc::now(),
        });
        ActionReport {
            intent,
            validation,
            outcome,
            impact: None,
            narration,
            used_fallback,
            retaliation: None,
        }
    }

    fn narrate(&mut self, request: &NarrationRequest) -> String {
        match self.narrator.narrate(request) {
            Ok(text) => text,
            Err(e) => {
                self.narration_fallback(&e.to_string());
                TemplateNarrator::default()
                    .narrate(request)
                    .unwrap_or_default()
            }
        }
    }

    fn narration_fallback(&mut self, cause: &str) {
        warn!(%cause, "narrator failed, using template narration");
        self.journal.append(JournalEntry::CollaboratorFallback {
            collaborator: "narrator".to_string(),
            cause: cause.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Mark the current room visited and describe it if it has no
    /// description yet, or unconditionally when `fresh` is set.
    fn enter_current_room(&mut self, fresh: bool) -> EngineResult<Room> {
        let position = self.player.position;
        let room = self.dungeon.get_room(position)?;
        let description = if fresh || room.description.is_empty() {
            let view = RoomView::of(room);
            Some(match self.narrator.describe_room(&view) {
                Ok(text) => text,
                Err(e) => {
                    self.narration_fallback(&e.to_string());
                    TemplateNarrator::default()
                        .describe_room(&view)
                        .unwrap_or_default()
                }
            })
        } else {
            None
        };

        let room = self.dungeon.get_room_mut(position)?;
        room.visited = true;
        if let Some(description) = description {
            room.description = description;
        }
        Ok(room.clone())
    }

    fn ensure_playing(&self) -> EngineResult<()> {
        if self.status.is_over() {
            return Err(EngineError::GameOver);
        }
        Ok(())
    }

    /// Discard an open stair prompt, returning its direction.
    fn abandon_prompt(&mut self) -> Option<StairDirection> {
        let direction = self.stairs.interrupt()?;
        info!(%direction, "stair prompt abandoned");
        self.journal.append(JournalEntry::StairsDeclined {
            direction,
            timestamp: Utc::now(),
        });
        Some(direction)
    }

    /// Discard an open stair prompt. Returns an error when one was open so
    /// the interrupting command is not carried out.
    fn drop_pending(&mut self) -> EngineResult<()> {
        match self.abandon_prompt() {
            Some(direction) => Err(EngineError::TransitionDeclined { direction }),
            None => Ok(()),
        }
    }

    fn end_run(&mut self, status: RunStatus) {
        self.status = status;
        self.stairs.interrupt();
        let victory = status == RunStatus::Victory;
        info!(victory, turns = self.turn, "run ended");
        self.journal.append(JournalEntry::RunEnded {
            victory,
            turns: self.turn,
            timestamp: Utc::now(),
        });
    }

    // -- Command processing -------------------------------------------------

    /// Process a line of player input and return the text to display.
    ///
    /// Only `yes`/`no` answer an open stair prompt; any other input declines
    /// it. `help`, `status`, `save`, `load`, and `quit` still run after the
    /// decline. Every other command is dropped along with the prompt.
    pub fn process(&mut self, input: &str) -> EngineResult<String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(String::new());
        }

        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };
        let lower = cmd.to_lowercase();

        let declined = match lower.as_str() {
            "yes" | "y" | "no" => None,
            _ => self.abandon_prompt(),
        };
        let meta = match lower.as_str() {
            "help" | "?" => Some(Ok(self.do_help())),
            "quit" | "exit" | "q" => Some(Ok("Farewell.".to_string())),
            "status" | "stats" => Some(Ok(self.do_status())),
            "save" => Some(self.do_save(rest)),
            "load" => Some(self.do_load(rest)),
            _ => None,
        };
        if let Some(result) = meta {
            return result.map(|out| match declined {
                Some(direction) => format!("You stay off the stairs leading {direction}.\n\n{out}"),
                None => out,
            });
        }
        if let Some(direction) = declined {
            return Err(EngineError::TransitionDeclined { direction });
        }

        match lower.as_str() {
            "yes" | "y" => {
                let outcome = self.confirm_transition(true)?;
                Ok(format!(
                    "You take the stairs to level {}.\n\n{}",
                    outcome.new_z + 1,
                    self.look()?
                ))
            }
            "no" => {
                self.confirm_transition(false)?;
                Ok("You stay where you are.".to_string())
            }
            _ => self.do_command(&lower, input, rest),
        }
    }

    fn do_command(&mut self, cmd: &str, input: &str, rest: &str) -> EngineResult<String> {
        if rest.is_empty() {
            if let Some(direction) = Direction::parse(cmd) {
                return self.do_move(direction);
            }
        }
        match cmd {
            "go" | "move" | "walk" => match Direction::parse(rest) {
                Some(direction) => self.do_move(direction),
                None => Err(EngineError::UnknownCommand(input.to_string())),
            },
            "look" | "l" if rest.is_empty() => self.look(),
            "inventory" | "inv" | "i" => Ok(self.do_inventory()),
            "quests" | "quest" => Ok(self.do_quests()),
            "journal" => Ok(self.do_journal()),
            "stairs" => {
                let direction = self.offer_stairs()?;
                Ok(format!("The stairs lead {direction}. Take them? (yes/no)"))
            }
            "equip" | "wield" | "wear" => self.do_equip(rest),
            _ => {
                let report = self.resolve_free_action(input)?;
                Ok(self.render_report(&report))
            }
        }
    }

    fn do_move(&mut self, direction: Direction) -> EngineResult<String> {
        let outcome = self.attempt_move(direction)?;
        let mut out = self.describe(&outcome.room)?;
        if let Some(h) = &outcome.hazard {
            let roll = format!(
                "({} d20 {} {:+} = {} vs {})",
                h.attribute, h.roll_value, h.attribute_modifier, h.total, h.difficulty
            );
            if h.avoided {
                let _ = write!(out, "\n\nThe {} springs, but you evade it. {roll}", h.hazard);
            } else {
                let _ = write!(
                    out,
                    "\n\nThe {} catches you for {} damage. {roll}",
                    h.hazard, h.damage
                );
            }
        }
        if let Some(direction) = outcome.direction {
            let _ = write!(out, "\n\nThe stairs lead {direction}. Take them? (yes/no)");
        }
        self.push_run_end(&mut out);
        Ok(out)
    }

    /// Describe the current room, its exits, and any open stair prompt.
    pub fn look(&self) -> EngineResult<String> {
        let mut out = self.describe(self.current_room()?)?;
        if let Some(direction) = self.stairs.pending() {
            let _ = write!(out, "\n\nThe stairs lead {direction}. Take them? (yes/no)");
        }
        Ok(out)
    }

    fn describe(&self, room: &Room) -> EngineResult<String> {
        let mut out = room.description.clone();
        if let Some(monster) = &room.monster {
            let _ = write!(
                out,
                "\n{} is here ({}/{} HP).",
                monster.name, monster.hp, monster.max_hp
            );
        }
        if let Some(npc) = &room.npc {
            let _ = write!(out, "\n{} the {} is here.", npc.name, npc.role);
        }
        if let Some(hazard) = room.armed_hazard() {
            let _ = write!(out, "\nBeware: {hazard}.");
        }
        for item in &room.items {
            let _ = write!(out, "\nOn the floor: {}.", item.name);
        }
        if !room.features.is_empty() {
            let _ = write!(out, "\nYou notice: {}.", room.features.join(", "));
        }
        let exits: Vec<String> = self
            .dungeon
            .get_exits(room.position)?
            .into_iter()
            .map(|d| d.to_string())
            .collect();
        let _ = write!(out, "\nExits: {}", exits.join(", "));
        Ok(out)
    }

    fn render_report(&self, report: &ActionReport) -> String {
        let mut out = report.narration.clone();
        match (&report.outcome, report.validation.reason) {
            (Some(outcome), None) => {
                let _ = write!(
                    out,
                    "\n({} {} {:+} = {} vs {}: {})",
                    dv_mechanics::check::CHECK_DIE,
                    outcome.roll_value,
                    outcome.attribute_modifier,
                    outcome.total,
                    outcome.difficulty,
                    outcome.classification
                );
            }
            (_, Some(reason)) => {
                let _ = write!(out, "\n[{}]", reason.code());
            }
            (None, None) => {}
        }
        if let Some(strike) = &report.retaliation {
            if strike.hit {
                let _ = write!(
                    out,
                    "\nThe {} strikes you for {} damage.",
                    strike.monster, strike.damage
                );
            } else {
                let _ = write!(out, "\nYou dodge the {}.", strike.monster);
            }
        }
        self.push_run_end(&mut out);
        out
    }

    fn push_run_end(&self, out: &mut String) {
        match self.status {
            RunStatus::Victory => {
                out.push_str("\n\nThe dungeon's master is dead. You have won.");
            }
            RunStatus::Defeated => out.push_str("\n\nYou have fallen. The run is over."),
            RunStatus::Playing => {}
        }
    }

    fn do_status(&self) -> String {
        let p = &self.player;
        let mut out = format!(
            "{} | level {} | HP {}/{} | XP {}/{} | gold {}",
            p.name,
            p.level,
            p.hp(),
            p.max_hp(),
            p.xp,
            p.xp_to_next(self.config.progression.xp_per_level),
            p.gold
        );
        let attrs: Vec<String> = dv_core::Attribute::ALL
            .into_iter()
            .map(|a| format!("{} {}", a.name(), p.attributes.score(a)))
            .collect();
        let _ = write!(out, "\n{}", attrs.join(", "));
        let _ = write!(
            out,
            "\nPosition {} on level {} of {} | turn {}",
            p.position,
            p.position.z + 1,
            self.dungeon.num_levels(),
            self.turn
        );
        out
    }

    fn do_inventory(&self) -> String {
        let mut out = String::new();
        for (id, count) in self.player.inventory() {
            if let Some(item) = self.player.item(id) {
                let _ = writeln!(out, "  {} x{count}", item.name);
            }
        }
        for (slot, item) in self.player.equipment() {
            let _ = writeln!(out, "  {} (equipped, {slot})", item.name);
        }
        if out.is_empty() {
            "You carry nothing.".to_string()
        } else {
            format!("You carry:\n{}", out.trim_end())
        }
    }

    fn do_quests(&self) -> String {
        let mut out = String::new();
        for quest in self.player.quests.iter() {
            let mark = if quest.is_complete() { "x" } else { " " };
            let _ = writeln!(out, "[{mark}] {}", quest.title);
            for objective in &quest.objectives {
                let _ = writeln!(
                    out,
                    "    {} {} ({}/{})",
                    objective.kind, objective.target, objective.current, objective.required
                );
            }
        }
        if out.is_empty() {
            "No quests.".to_string()
        } else {
            out.trim_end().to_string()
        }
    }

    fn do_journal(&self) -> String {
        if self.journal.is_empty() {
            return "The journal is empty.".to_string();
        }
        self.journal
            .recent(10)
            .iter()
            .map(Journal::render_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn do_equip(&mut self, name: &str) -> EngineResult<String> {
        self.ensure_playing()?;
        if name.is_empty() {
            return Err(EngineError::UnknownCommand("equip <item>".to_string()));
        }
        let Some(item) = self.player.find_item(name).cloned() else {
            return Ok(format!("You are not carrying any {name}."));
        };
        Ok(match self.player.equip(&item.id) {
            Some(slot) => format!("You equip the {} ({slot}).", item.name),
            None => format!("The {} cannot be equipped.", item.name),
        })
    }

    fn do_save(&mut self, path: &str) -> EngineResult<String> {
        if path.is_empty() {
            return Err(EngineError::UnknownCommand("save <path>".to_string()));
        }
        self.save(Path::new(path))?;
        Ok(format!("Saved to {path}."))
    }

    fn do_load(&mut self, path: &str) -> EngineResult<String> {
        if path.is_empty() {
            return Err(EngineError::UnknownCommand("load <path>".to_string()));
        }
        self.load(Path::new(path))?;
        Ok(format!("Loaded {path}.\n\n{}", self.look()?))
    }

    fn do_help(&self) -> String {
        "\
Movement:
  n, s, e, w / go <direction>   Walk to a neighbouring room
  yes / no                      Answer a stair prompt
  stairs                        Ask again about the stairs underfoot

Looking around:
  look                          Describe the room
  status                        Show your character
  inventory                     List what you carry
  quests                        Show quest progress
  journal                       Show recent events

Other:
  equip <item>                  Equip a carried item
  save <path> / load <path>     Save or restore the run
  quit                          Leave the game

Anything else is attempted as a free action, e.g. \"attack the rat\"."
            .to_string()
    }
}

/// A default adventurer with average attributes.
pub fn default_player(name: &str) -> Player {
    Player::new(name, Attributes::default())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use dv_core::{Attribute, Item, ItemKind, Monster, RoomType};
    use dv_mechanics::{ActionType, Classification, FixedRolls};

    use super::*;
    use crate::collaborator::CollaboratorError;
    use crate::stairs::StairState;

    struct Scripted(String);

    impl IntentExtractor for Scripted {
        fn extract(&self, _request: &IntentRequest) -> Result<String, CollaboratorError> {
            Ok(self.0.clone())
        }
    }

    struct Slow;

    impl IntentExtractor for Slow {
        fn extract(&self, _request: &IntentRequest) -> Result<String, CollaboratorError> {
            std::thread::sleep(Duration::from_millis(500));
            Ok("{}".to_string())
        }
    }

    #[derive(Default)]
    struct Counting {
        rooms: AtomicUsize,
    }

    impl Narrator for Counting {
        fn narrate(&self, _request: &NarrationRequest) -> Result<String, CollaboratorError> {
            Ok("It happens.".to_string())
        }

        fn describe_room(&self, room: &RoomView) -> Result<String, CollaboratorError> {
            let n = self.rooms.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Room {} (description {n})", room.position))
        }
    }

    /// Two 3x3 levels. A rat at (1,0,0), stairs down at (2,2,0), the boss
    /// room at (0,0,1).
    fn small_dungeon() -> Dungeon {
        let mut dungeon = Dungeon::with_stairs(3, 2).unwrap();
        let rat = dungeon.get_room_mut(Position::new(1, 0, 0)).unwrap();
        rat.room_type = RoomType::Monster;
        rat.monster = Some(Monster::new("Shadow Rat", 10, 3, 1));
        let boss = dungeon.get_room_mut(Position::new(0, 0, 1)).unwrap();
        boss.monster = Some(Monster::new("Orc Chieftain", 5, 9, 0).into_boss());
        dungeon
    }

    fn strong_player() -> Player {
        Player::new("Ayla", Attributes::default().with(Attribute::Strength, 14))
    }

    /// `small_dungeon` with a spike trap south of the start.
    fn trapped_dungeon() -> Dungeon {
        let mut dungeon = small_dungeon();
        let trap = dungeon.get_room_mut(Position::new(0, 1, 0)).unwrap();
        trap.room_type = RoomType::Hazard;
        trap.hazard = Some("Spike Trap".to_string());
        dungeon
    }

    /// `small_dungeon` with the rat already on guard.
    fn alerted_dungeon() -> Dungeon {
        let mut dungeon = small_dungeon();
        let room = dungeon.get_room_mut(Position::new(1, 0, 0)).unwrap();
        if let Some(rat) = room.monster.as_mut() {
            rat.alerted = true;
        }
        dungeon
    }

    fn fresh_session() -> GameSession {
        GameSession::from_parts(EngineConfig::default(), small_dungeon(), strong_player()).unwrap()
    }

    fn scripted(session: GameSession, json: &str) -> GameSession {
        session.with_collaborators(
            Arc::new(Scripted(json.to_string())),
            Arc::new(TemplateNarrator::default()),
        )
    }

    fn walk_to_stairs(session: &mut GameSession) -> MoveOutcome {
        session.attempt_move(Direction::East).unwrap();
        session.attempt_move(Direction::East).unwrap();
        session.attempt_move(Direction::South).unwrap();
        session.attempt_move(Direction::South).unwrap()
    }

    const ATTACK_RAT: &str = r#"{"action_type": "physical_attack", "target": "Shadow Rat",
        "method": "slash with my fists", "plausibility": 0.75, "valid": true}"#;

    const SEARCH: &str = r#"{"action_type": "environment_action", "method": "search the walls",
        "plausibility": 0.9, "valid": true}"#;

    #[test]
    fn new_session_starts_at_origin_with_main_quest() {
        let session = GameSession::new(EngineConfig::default(), default_player("Ayla")).unwrap();
        assert_eq!(session.player().position, Position::origin());
        assert!(session.player().quests.get("main").is_some());
        assert!(!session.current_room().unwrap().description.is_empty());
        assert!(matches!(
            session.journal().entries().first(),
            Some(JournalEntry::RunStarted { seed: 42, .. })
        ));
    }

    #[test]
    fn edge_of_the_map_blocks_movement() {
        let mut session = fresh_session();
        let err = session.attempt_move(Direction::North).unwrap_err();
        assert!(matches!(err, EngineError::NoExit { .. }));
        assert_eq!(session.player().position, Position::origin());
        assert_eq!(session.turn(), 0);
    }

    #[test]
    fn entering_stairs_opens_a_prompt_without_moving_levels() {
        let mut session = fresh_session();
        let outcome = walk_to_stairs(&mut session);
        assert!(outcome.transition_pending);
        assert_eq!(outcome.direction, Some(StairDirection::Down));
        assert_eq!(session.player().position, Position::new(2, 2, 0));
        assert_eq!(session.pending_transition(), Some(StairDirection::Down));
    }

    #[test]
    fn confirming_descends_and_redescribes_the_room() {
        let narrator = Arc::new(Counting::default());
        let mut session = fresh_session().with_collaborators(
            Arc::new(KeywordInterpreter::new()),
            Arc::clone(&narrator) as Arc<dyn Narrator>,
        );
        walk_to_stairs(&mut session);
        let before = narrator.rooms.load(Ordering::SeqCst);

        let outcome = session.confirm_transition(true).unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.new_z, 1);
        assert_eq!(session.player().position, Position::new(2, 2, 1));
        assert_eq!(narrator.rooms.load(Ordering::SeqCst), before + 1);
        assert!(outcome.room.visited);
        // Arriving on the stairs up does not prompt again.
        assert_eq!(session.pending_transition(), None);
    }

    #[test]
    fn declining_stays_on_the_level() {
        let mut session = fresh_session();
        walk_to_stairs(&mut session);
        let outcome = session.confirm_transition(false).unwrap();
        assert!(!outcome.accepted);
        assert_eq!(outcome.new_z, 0);
        assert_eq!(session.stairs.state(), StairState::Exploring);
    }

    #[test]
    fn other_input_while_prompted_declines_and_is_not_executed() {
        let mut session = fresh_session();
        walk_to_stairs(&mut session);
        let err = session.attempt_move(Direction::North).unwrap_err();
        assert!(matches!(
            err,
            EngineError::TransitionDeclined {
                direction: StairDirection::Down
            }
        ));
        assert_eq!(session.player().position, Position::new(2, 2, 0));
        assert_eq!(session.pending_transition(), None);
        assert!(matches!(
            session.confirm_transition(true),
            Err(EngineError::NoPendingTransition)
        ));
    }

    #[test]
    fn stairs_command_reopens_the_prompt() {
        let mut session = fresh_session();
        walk_to_stairs(&mut session);
        session.confirm_transition(false).unwrap();
        assert_eq!(session.offer_stairs().unwrap(), StairDirection::Down);
        assert_eq!(session.confirm_transition(true).unwrap().new_z, 1);
    }

    #[test]
    fn answer_without_prompt_is_an_error() {
        let mut session = fresh_session();
        assert!(matches!(
            session.confirm_transition(true),
            Err(EngineError::NoPendingTransition)
        ));
    }

    #[test]
    fn attack_resolves_end_to_end() {
        let mut session =
            scripted(fresh_session(), ATTACK_RAT).with_rolls(FixedRolls::new([14, 20, 1]));
        session.attempt_move(Direction::East).unwrap();
        let max = session.player().max_hp();

        let report = session.resolve_free_action("I punch the rat").unwrap();
        assert!(report.validation.allowed);
        assert!(!report.used_fallback);
        let outcome = report.outcome.unwrap();
        assert_eq!(outcome.difficulty, 8);
        assert_eq!(outcome.total, 16);
        assert_eq!(outcome.margin, 8);
        assert_eq!(outcome.classification, Classification::Success);

        let rat = session.current_room().unwrap().monster.clone().unwrap();
        assert_eq!(rat.hp, 5);
        assert_eq!(session.player().xp, 10);
        assert_eq!(session.turn(), 2);

        // The wounded rat bites back: d6 1 + attack 3.
        let strike = report.retaliation.unwrap();
        assert!(strike.hit);
        assert_eq!(strike.damage, 4);
        assert_eq!(session.player().hp(), max - 4);
    }

    #[test]
    fn talking_to_a_calm_monster_provokes_nothing() {
        let json = r#"{"action_type": "social", "target": "Shadow Rat",
            "method": "talk to it", "plausibility": 0.9, "valid": true}"#;
        let mut session = scripted(fresh_session(), json).with_rolls(FixedRolls::new([15, 20, 6]));
        session.attempt_move(Direction::East).unwrap();
        let max = session.player().max_hp();

        let report = session.resolve_free_action("talk to the rat").unwrap();
        assert!(report.outcome.is_some());
        assert!(report.retaliation.is_none());
        assert_eq!(session.player().hp(), max);
    }

    #[test]
    fn alerted_monster_strikes_after_any_action() {
        let session =
            GameSession::from_parts(EngineConfig::default(), alerted_dungeon(), strong_player())
                .unwrap();
        let mut session = scripted(session, SEARCH).with_rolls(FixedRolls::new([10, 20, 3]));
        session.attempt_move(Direction::East).unwrap();
        let max = session.player().max_hp();

        let report = session.resolve_free_action("search the walls").unwrap();
        assert_eq!(
            report.outcome.as_ref().map(|o| o.classification),
            Some(Classification::Success)
        );
        let strike = report.retaliation.unwrap();
        assert!(strike.hit);
        assert_eq!(strike.damage, 6);
        assert_eq!(session.player().hp(), max - 6);
        assert!(matches!(
            session.journal().entries().last(),
            Some(JournalEntry::MonsterStruck { hit: true, damage: 6, .. })
        ));
    }

    #[test]
    fn alerted_monster_can_end_the_run() {
        let mut player = strong_player();
        let max = player.max_hp();
        player.damage(max - 1);
        let session = GameSession::from_parts(EngineConfig::default(), alerted_dungeon(), player)
            .unwrap();
        let mut session = scripted(session, SEARCH).with_rolls(FixedRolls::new([10, 20, 1]));
        session.attempt_move(Direction::East).unwrap();

        let out = session.process("search the walls").unwrap();
        assert!(out.contains("Shadow Rat strikes you"));
        assert!(out.contains("run is over"));
        assert!(session.player().is_dead());
        assert_eq!(session.status(), RunStatus::Defeated);
        assert!(matches!(
            session.journal().entries().last(),
            Some(JournalEntry::RunEnded { victory: false, .. })
        ));
    }

    #[test]
    fn critical_blunder_puts_the_rat_on_guard() {
        let blunder = r#"{"action_type": "social", "method": "shout at the walls",
            "plausibility": 0.1, "valid": true}"#;
        let mut session = scripted(fresh_session(), blunder).with_rolls(FixedRolls::new([1]));
        session.attempt_move(Direction::East).unwrap();

        let report = session.resolve_free_action("shout at the walls").unwrap();
        assert_eq!(
            report.outcome.as_ref().map(|o| o.classification),
            Some(Classification::CriticalFailure)
        );
        // The blunder alerts the rat, which strikes in the same turn.
        assert!(session.current_room().unwrap().monster.as_ref().is_some_and(|m| m.alerted));
        assert!(report.retaliation.is_some());
    }

    #[test]
    fn hazard_springs_once_on_entry() {
        let mut session =
            GameSession::from_parts(EngineConfig::default(), trapped_dungeon(), strong_player())
                .unwrap()
                .with_rolls(FixedRolls::new([3, 4]));
        let max = session.player().max_hp();

        let outcome = session.attempt_move(Direction::South).unwrap();
        let hazard = outcome.hazard.unwrap();
        assert!(!hazard.avoided);
        assert_eq!(hazard.damage, 6);
        assert!(outcome.room.hazard_triggered);
        assert_eq!(session.player().hp(), max - 6);
        assert!(matches!(
            session.journal().entries().last(),
            Some(JournalEntry::HazardSprung { damage: 6, .. })
        ));

        session.attempt_move(Direction::North).unwrap();
        let again = session.attempt_move(Direction::South).unwrap();
        assert!(again.hazard.is_none());
        assert_eq!(session.player().hp(), max - 6);
    }

    #[test]
    fn hazard_can_end_the_run() {
        let mut player = strong_player();
        let max = player.max_hp();
        player.damage(max - 1);
        let mut session = GameSession::from_parts(EngineConfig::default(), trapped_dungeon(), player)
            .unwrap()
            .with_rolls(FixedRolls::new([1, 1]));

        let out = session.process("s").unwrap();
        assert!(out.contains("Spike Trap catches you"));
        assert!(out.contains("run is over"));
        assert_eq!(session.status(), RunStatus::Defeated);
        assert!(matches!(
            session.attempt_move(Direction::North),
            Err(EngineError::GameOver)
        ));
    }

    #[test]
    fn absent_target_is_rejected_before_rolling() {
        let mut session = scripted(fresh_session(), ATTACK_RAT).with_rolls(FixedRolls::new([14]));
        let before = session.snapshot();

        let report = session.resolve_free_action("I punch the rat").unwrap();
        assert!(!report.validation.allowed);
        assert_eq!(report.validation.reason, Some(RejectionReason::TargetNotPresent));
        assert!(report.outcome.is_none());
        assert_eq!(session.snapshot(), before);
        assert!(matches!(
            session.journal().entries().last(),
            Some(JournalEntry::ActionRejected { .. })
        ));
    }

    #[test]
    fn malformed_interpreter_output_falls_back() {
        let mut session = scripted(fresh_session(), "I think you want to attack?")
            .with_rolls(FixedRolls::new([10]));
        let report = session.resolve_free_action("search the walls").unwrap();
        assert!(report.used_fallback);
        assert_eq!(report.intent.action_type, ActionType::EnvironmentAction);
        assert_eq!(report.intent.plausibility, Some(0.5));
        assert!(report.outcome.is_some());
        assert!(
            session
                .journal()
                .entries()
                .iter()
                .any(|e| matches!(e, JournalEntry::CollaboratorFallback { .. }))
        );
    }

    #[test]
    fn slow_interpreter_times_out_into_fallback() {
        let config = EngineConfig::default().with_timeout_ms(20);
        let mut session = GameSession::from_parts(config, small_dungeon(), strong_player())
            .unwrap()
            .with_collaborators(Arc::new(Slow), Arc::new(TemplateNarrator::default()))
            .with_rolls(FixedRolls::new([10]));
        let report = session.resolve_free_action("search the walls").unwrap();
        assert!(report.used_fallback);
    }

    #[test]
    fn missing_components_change_nothing() {
        let json = r#"{"action_type": "use_item", "method": "drink the potion",
            "plausibility": 0.9, "valid": true, "components_used": ["Healing Potion"]}"#;
        let mut session = scripted(fresh_session(), json).with_rolls(FixedRolls::new([15]));
        let before = session.snapshot();

        let report = session.resolve_free_action("drink the potion").unwrap();
        assert_eq!(
            report.validation.reason,
            Some(RejectionReason::InconsistentComponents)
        );
        assert!(report.impact.is_none());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn carried_components_are_consumed() {
        let json = r#"{"action_type": "use_item", "method": "drink the potion",
            "plausibility": 0.9, "valid": true, "components_used": ["Healing Potion"]}"#;
        let mut player = strong_player();
        player.add_item(
            Item::new("healing_potion", "Healing Potion", ItemKind::Consumable).with_heal(15),
            1,
        );
        player.damage(8);
        let mut session = GameSession::from_parts(EngineConfig::default(), small_dungeon(), player)
            .unwrap()
            .with_collaborators(
                Arc::new(Scripted(json.to_string())),
                Arc::new(TemplateNarrator::default()),
            )
            .with_rolls(FixedRolls::new([15]));

        let report = session.resolve_free_action("drink the potion").unwrap();
        assert!(report.impact.is_some());
        assert_eq!(
            session
                .player()
                .item_count(&dv_core::ItemId::new("healing_potion")),
            0
        );
    }

    #[test]
    fn slaying_the_boss_wins_the_run() {
        let json = r#"{"action_type": "physical_attack", "target": "Orc Chieftain",
            "method": "strike", "plausibility": 0.9, "valid": true}"#;
        let mut player = strong_player();
        player.position = Position::new(0, 0, 1);
        let mut session = GameSession::from_parts(EngineConfig::default(), small_dungeon(), player)
            .unwrap()
            .with_collaborators(
                Arc::new(Scripted(json.to_string())),
                Arc::new(TemplateNarrator::default()),
            )
            .with_rolls(FixedRolls::new([20]));

        let report = session.resolve_free_action("strike the chieftain").unwrap();
        assert!(report.impact.unwrap().boss_defeated());
        assert_eq!(session.status(), RunStatus::Victory);
        assert!(session.snapshot().victory);
        assert!(matches!(
            session.resolve_free_action("dance"),
            Err(EngineError::GameOver)
        ));
    }

    #[test]
    fn dying_ends_the_run() {
        let mut player = strong_player();
        let max = player.max_hp();
        player.damage(max - 1);
        let reckless = r#"{"action_type": "physical_attack", "target": "Shadow Rat",
            "method": "leap at it", "plausibility": 0.1, "valid": true}"#;
        let mut session = GameSession::from_parts(EngineConfig::default(), small_dungeon(), player)
            .unwrap()
            .with_collaborators(
                Arc::new(Scripted(reckless.to_string())),
                Arc::new(TemplateNarrator::default()),
            )
            .with_rolls(FixedRolls::new([1]));
        session.attempt_move(Direction::East).unwrap();

        let report = session.resolve_free_action("punch the rat").unwrap();
        assert_eq!(
            report.outcome.unwrap().classification,
            Classification::CriticalFailure
        );
        assert!(session.player().is_dead());
        assert_eq!(session.status(), RunStatus::Defeated);
        assert!(matches!(
            session.attempt_move(Direction::West),
            Err(EngineError::GameOver)
        ));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut session = fresh_session();
        walk_to_stairs(&mut session);
        session.save(&path).unwrap();

        let mut other = fresh_session();
        other.load(&path).unwrap();
        assert_eq!(other.snapshot(), session.snapshot());
        assert_eq!(other.pending_transition(), Some(StairDirection::Down));
        assert_eq!(other.turn(), 4);
    }

    #[test]
    fn corrupt_save_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut session = fresh_session();
        session.attempt_move(Direction::East).unwrap();
        session.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, text.replace("Shadow Rat", "Shadow Cat")).unwrap();

        let mut other = fresh_session();
        let before = other.snapshot();
        assert!(other.load(&path).is_err());
        assert_eq!(other.snapshot(), before);
    }

    #[test]
    fn process_routes_commands() {
        let mut session = fresh_session();
        assert!(session.process("help").unwrap().contains("Movement"));
        assert!(session.process("status").unwrap().contains("Ayla"));
        assert!(session.process("e").unwrap().contains("Shadow Rat"));
        assert!(session.process("look").unwrap().contains("Exits"));
        assert_eq!(session.process("inventory").unwrap(), "You carry nothing.");
        assert!(session.process("quests").unwrap().contains("No quests"));
        assert!(matches!(
            session.process("go up"),
            Err(EngineError::UnknownCommand(_))
        ));
        assert_eq!(session.process("   ").unwrap(), "");
    }

    #[test]
    fn process_answers_stair_prompts() {
        let mut session = fresh_session();
        for step in ["e", "e", "s"] {
            session.process(step).unwrap();
        }
        assert!(session.process("go south").unwrap().contains("yes/no"));
        assert!(session.process("yes").unwrap().contains("level 2"));
        assert_eq!(session.player().position.z, 1);
    }

    #[test]
    fn any_other_input_declines_the_prompt() {
        let mut session = fresh_session();
        walk_to_stairs(&mut session);

        let status = session.process("status").unwrap();
        assert!(status.starts_with("You stay off the stairs leading down."));
        assert!(status.contains("Ayla"));
        assert_eq!(session.pending_transition(), None);
        assert!(matches!(
            session.process("yes"),
            Err(EngineError::NoPendingTransition)
        ));

        assert!(session.process("stairs").unwrap().contains("yes/no"));
        assert!(matches!(
            session.process("n"),
            Err(EngineError::TransitionDeclined {
                direction: StairDirection::Down
            })
        ));
        assert_eq!(session.player().position, Position::new(2, 2, 0));
        assert_eq!(session.pending_transition(), None);
    }

    #[test]
    fn equip_command_grants_capability() {
        let mut player = strong_player();
        player.add_item(
            Item::new("levitation_ring", "Levitation Ring", ItemKind::Ring)
                .with_capability(dv_core::Capability::Fly),
            1,
        );
        let mut session =
            GameSession::from_parts(EngineConfig::default(), small_dungeon(), player).unwrap();
        assert!(session.process("equip levitation ring").unwrap().contains("equip"));
        assert!(session.player().has_capability(dv_core::Capability::Fly));
        assert!(session.process("equip sword").unwrap().contains("not carrying"));
    }
}
