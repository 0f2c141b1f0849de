//! Text rendering of server messages for the terminal

use crate::game::ClientGameState;
use shared::{EliminationCause, PlayerSummary, SeerMark, ServerMessage, Winner};

/// Lines to print for `message`. Call after the view has applied it.
pub fn describe(message: &ServerMessage, view: &ClientGameState) -> Vec<String> {
    match message {
        ServerMessage::Connected { your_id } => {
            vec![format!("Connected as player #{}. Type /help for commands.", your_id)]
        }
        ServerMessage::LobbyUpdate { players } => {
            let mut lines = vec![format!("Lobby: {} connected", players.len())];
            lines.extend(roster(players, view));
            lines
        }
        ServerMessage::AssignRole {
            role,
            heals_left,
            seer_checks_left,
            ..
        } => {
            let mut line = format!("Your role: {}", role);
            if let Some(heals) = heals_left {
                line.push_str(&format!(" ({} heals)", heals));
            }
            if let Some(checks) = seer_checks_left {
                line.push_str(&format!(" ({} checks per night)", checks));
            }
            vec![line]
        }
        ServerMessage::State { phase, players, .. } => {
            let mut lines = vec![format!("== {} ==", phase.to_string().to_uppercase())];
            lines.extend(roster(players, view));
            lines
        }
        ServerMessage::Chat { from, text } => vec![format!("<{}> {}", from, text)],
        ServerMessage::ActionAck { action } => vec![format!("ok: {}", action)],
        ServerMessage::VoteAck { target } => {
            vec![format!("ok: voted for {}", view.name_of(*target))]
        }
        ServerMessage::Error { message } => vec![format!("error: {}", message)],
        ServerMessage::RoleUpdate {
            heals_left,
            self_heal_used,
        } => vec![format!(
            "You healed someone. Heals left: {}{}",
            heals_left,
            if *self_heal_used {
                " (self-heal used)"
            } else {
                ""
            }
        )],
        ServerMessage::Eliminate { name, by, role, .. } => {
            let role = role.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string());
            vec![format!("{} ({}) {}", name, role, cause_text(*by))]
        }
        ServerMessage::SeerResult { target_id, mark } => {
            let verdict = match mark {
                SeerMark::Evil => "😈 evil",
                SeerMark::Good => "😇 good",
            };
            vec![format!("Seer: {} is {}", view.name_of(*target_id), verdict)]
        }
        ServerMessage::GameOver { winner } => vec![match winner {
            Winner::Good => "Game over: the village wins!".to_string(),
            Winner::Evil => "Game over: evil wins!".to_string(),
        }],
        ServerMessage::RolesRevealed { roles } => {
            let mut lines = vec!["Roles:".to_string()];
            for reveal in roles {
                let role = reveal
                    .role
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "none".to_string());
                lines.push(format!("  #{} {}: {}", reveal.id, reveal.name, role));
            }
            lines
        }
    }
}

fn cause_text(cause: EliminationCause) -> &'static str {
    match cause {
        EliminationCause::Night => "was killed in the night",
        EliminationCause::Vote => "was voted out",
        EliminationCause::BlackjackGuess => "was exposed by the blackjack",
        EliminationCause::BlackjackFail => "guessed wrong as blackjack",
        EliminationCause::WhitejackGuess => "was exposed by the whitejack",
        EliminationCause::WhitejackFail => "guessed wrong as whitejack",
    }
}

fn roster(players: &[PlayerSummary], view: &ClientGameState) -> Vec<String> {
    players
        .iter()
        .map(|p| {
            format!(
                "  #{} {}{}{}",
                p.id,
                p.name,
                if p.alive { "" } else { " [dead]" },
                if view.is_me(p.id) { " (you)" } else { "" }
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Phase, Role};

    fn view_as(id: u32) -> ClientGameState {
        let mut view = ClientGameState::new();
        view.apply(&ServerMessage::Connected { your_id: id });
        view
    }

    #[test]
    fn test_state_lists_roster() {
        let view = view_as(2);
        let lines = describe(
            &ServerMessage::State {
                phase: Phase::Night,
                players: vec![
                    PlayerSummary {
                        id: 1,
                        name: "Ann".to_string(),
                        alive: false,
                    },
                    PlayerSummary {
                        id: 2,
                        name: "Bo".to_string(),
                        alive: true,
                    },
                ],
                logs: vec![],
            },
            &view,
        );
        assert_eq!(
            lines,
            vec!["== NIGHT ==", "  #1 Ann [dead]", "  #2 Bo (you)"]
        );
    }

    #[test]
    fn test_elimination_shows_role_and_cause() {
        let lines = describe(
            &ServerMessage::Eliminate {
                id: 4,
                name: "Dee".to_string(),
                by: EliminationCause::Vote,
                role: Some(Role::Killer),
            },
            &view_as(1),
        );
        assert_eq!(lines, vec!["Dee (killer) was voted out"]);
    }

    #[test]
    fn test_error_and_chat() {
        let view = view_as(1);
        assert_eq!(
            describe(
                &ServerMessage::Error {
                    message: "You are dead".to_string()
                },
                &view
            ),
            vec!["error: You are dead"]
        );
        assert_eq!(
            describe(
                &ServerMessage::Chat {
                    from: "Ann".to_string(),
                    text: "hi".to_string()
                },
                &view
            ),
            vec!["<Ann> hi"]
        );
    }
}
