//! Phase-end resolution of buffered actions
//!
//! Night resolution settles the kill vote, lets a doctor save the victim
//! and reveals seer checks. Discussion resolution settles blackjack and
//! whitejack guesses. Both only mutate the session registry and append
//! to the event log and outbox; the room runs the win check afterwards.

use crate::actions::Action;
use crate::config::SeerReveal;
use crate::outbound::Outbox;
use crate::rng::{choose, RandomSource};
use crate::session::{RoleState, SessionRegistry};
use log::{debug, info};
use shared::{
    ActionKind, Alignment, EliminationCause, Role, SeerMark, ServerMessage, EVIL_GUESS_ROLES,
    GOOD_GUESS_ROLES,
};
use std::collections::BTreeMap;

/// Mutable view of the room used while resolving a phase
pub struct Resolver<'a> {
    pub registry: &'a mut SessionRegistry,
    pub logs: &'a mut Vec<String>,
    pub outbox: &'a mut Outbox,
    pub rng: &'a mut dyn RandomSource,
}

impl<'a> Resolver<'a> {
    /// Marks a living session dead and publishes it. Returns false when
    /// the session is gone or already dead.
    pub fn eliminate(&mut self, id: u32, cause: EliminationCause, log_line: String) -> bool {
        let Some(session) = self.registry.get_mut(id) else {
            return false;
        };
        if !session.alive {
            return false;
        }

        session.alive = false;
        info!("Session {} eliminated ({:?})", id, cause);
        self.logs.push(log_line);
        self.outbox.broadcast(ServerMessage::Eliminate {
            id,
            name: session.name.clone(),
            by: cause,
            role: session.role(),
        });
        true
    }

    /// Night: kill vote, doctor save, seer reveals
    pub fn resolve_night(&mut self, actions: &[Action], seer_reveal: SeerReveal) {
        if let Some(victim) = self.pick_victim(actions) {
            self.resolve_attack(victim);
        }

        for action in actions.iter().filter(|a| a.kind == ActionKind::Seer) {
            self.reveal(action, seer_reveal);
        }
    }

    /// Most-targeted living session; ties go to a uniform random pick
    fn pick_victim(&mut self, actions: &[Action]) -> Option<u32> {
        let mut tally: BTreeMap<u32, usize> = BTreeMap::new();
        for action in actions.iter().filter(|a| a.kind == ActionKind::Kill) {
            if let Some(target) = action.target {
                if self.registry.is_alive(target) {
                    *tally.entry(target).or_insert(0) += 1;
                }
            }
        }

        let top = *tally.values().max()?;
        let candidates: Vec<u32> = tally
            .into_iter()
            .filter(|(_, count)| *count == top)
            .map(|(target, _)| target)
            .collect();
        choose(self.rng, &candidates).copied()
    }

    fn resolve_attack(&mut self, victim: u32) {
        let name = match self.registry.get(victim) {
            Some(session) => session.name.clone(),
            None => return,
        };

        match self.heal(victim) {
            Some(healer) => {
                info!("Session {} saved by doctor {}", victim, healer);
                self.logs.push(format!(
                    "Player {} was saved by doctor (doctor id {}).",
                    name, healer
                ));
                self.outbox.broadcast(ServerMessage::Chat {
                    from: "[SYSTEM]".to_string(),
                    text: format!("Player {} was saved by a doctor.", name),
                });
            }
            None => {
                self.eliminate(
                    victim,
                    EliminationCause::Night,
                    format!("Player {} was killed at night.", name),
                );
            }
        }
    }

    /// Spends one doctor heal on the victim, if any doctor can. A doctor
    /// who is the victim and still has their self-heal uses it first;
    /// otherwise a random living doctor with heals left steps in. The
    /// victim is never in that draw, so a self-heal happens at most once.
    fn heal(&mut self, victim: u32) -> Option<u32> {
        let self_heal = self.registry.get(victim).map_or(false, |session| {
            session.alive
                && matches!(
                    session.role,
                    Some(RoleState::Doctor {
                        heals_left,
                        self_heal_used: false
                    }) if heals_left > 0
                )
        });

        let healer = if self_heal {
            victim
        } else {
            let doctors: Vec<u32> = self
                .registry
                .iter()
                .filter(|s| s.id != victim)
                .filter(|s| s.alive && s.heals_left().map_or(false, |left| left > 0))
                .map(|s| s.id)
                .collect();
            *choose(self.rng, &doctors)?
        };

        let session = self.registry.get_mut(healer)?;
        if let Some(RoleState::Doctor {
            heals_left,
            self_heal_used,
        }) = session.role.as_mut()
        {
            *heals_left -= 1;
            if healer == victim {
                *self_heal_used = true;
            }
            let update = ServerMessage::RoleUpdate {
                heals_left: *heals_left,
                self_heal_used: *self_heal_used,
            };
            self.outbox.direct(healer, update);
        }

        Some(healer)
    }

    fn reveal(&mut self, action: &Action, seer_reveal: SeerReveal) {
        let Some(target) = action.target.and_then(|id| self.registry.get(id)) else {
            return;
        };
        let mark = SeerMark::from(
            target
                .role()
                .map_or(Alignment::Good, |role| role.alignment()),
        );
        let message = ServerMessage::SeerResult {
            target_id: target.id,
            mark,
        };

        match seer_reveal {
            SeerReveal::Public => self.outbox.broadcast(message),
            SeerReveal::Private => {
                if self.registry.get(action.actor).is_some() {
                    self.outbox.direct(action.actor, message);
                }
            }
        }
    }

    /// Discussion: blackjack and whitejack guesses. Guesses from other
    /// roles were accepted at intake but have no effect.
    pub fn resolve_discussion(&mut self, actions: &[Action]) {
        for action in actions.iter().filter(|a| a.kind == ActionKind::Guess) {
            self.resolve_guess(action);
        }
    }

    fn resolve_guess(&mut self, action: &Action) {
        let Some(actor) = self.registry.get(action.actor) else {
            return;
        };
        let Some(target) = action.target.and_then(|id| self.registry.get(id)) else {
            return;
        };
        if !actor.alive {
            debug!("Skipping guess from session {} who died earlier", actor.id);
            return;
        }

        let actor_role = actor.role();
        let target_role = target.role();
        let actor_name = actor.name.clone();
        let target_name = target.name.clone();
        let (actor_id, target_id) = (actor.id, target.id);

        let (correct, title, hit, miss) = match actor_role {
            Some(Role::Blackjack) => (
                action.guess == Some(Alignment::Good)
                    && target_role.map_or(false, |r| GOOD_GUESS_ROLES.contains(&r)),
                "Blackjack",
                EliminationCause::BlackjackGuess,
                EliminationCause::BlackjackFail,
            ),
            Some(Role::Whitejack) => (
                action.guess == Some(Alignment::Evil)
                    && target_role.map_or(false, |r| EVIL_GUESS_ROLES.contains(&r)),
                "Whitejack",
                EliminationCause::WhitejackGuess,
                EliminationCause::WhitejackFail,
            ),
            _ => {
                debug!("Ignoring guess from session {} ({:?})", actor_id, actor_role);
                return;
            }
        };

        if correct {
            self.eliminate(
                target_id,
                hit,
                format!(
                    "{} {} guessed correctly; {} died.",
                    title, actor_name, target_name
                ),
            );
        } else {
            self.eliminate(
                actor_id,
                miss,
                format!("{} {} guessed wrong and died.", title, actor_name),
            );
        }
    }
}
