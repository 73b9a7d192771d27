//! Interactive JSON-lines session.
//!
//! A controller (a human front end or an external agent) plays the Player
//! side against the built-in AI by exchanging [`protocol`](crate::protocol)
//! messages. Time only advances on `tick` requests.

use std::io::{self, BufRead, Write};

use pw_core::entities::{PlanetId, Side};
use pw_core::simulation::Match;
use tracing::{debug, info};

use crate::protocol::{Request, Response, StateView};
use crate::runner::MatchOutcome;

/// Most ticks a single request may run.
pub const MAX_TICKS_PER_REQUEST: u32 = 60 * 60 * 10;

/// One match driven by protocol requests.
#[derive(Debug)]
pub struct Session {
    game: Match,
    frame_dt: f64,
    game_over_sent: bool,
    finished: bool,
}

impl Session {
    /// Wrap a match; each tick advances `frame_dt` seconds.
    #[must_use]
    pub fn new(game: Match, frame_dt: f64) -> Self {
        Self {
            game,
            frame_dt,
            game_over_sent: false,
            finished: false,
        }
    }

    /// The match being played.
    #[must_use]
    pub fn game(&self) -> &Match {
        &self.game
    }

    /// Whether a `quit` request has been handled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Handle one request and return the responses, in order.
    pub fn handle(&mut self, request: Request) -> Vec<Response> {
        let name = request.name();
        debug!(cmd = name, "Request");
        let mut responses = match request {
            Request::Tick { count } => {
                let count = count.min(MAX_TICKS_PER_REQUEST);
                let mut events = Vec::new();
                for _ in 0..count {
                    if self.game.is_terminal() {
                        break;
                    }
                    events.extend(self.game.tick(self.frame_dt));
                }
                vec![Response::Events {
                    elapsed_secs: self.game.elapsed_secs(),
                    events,
                }]
            }
            Request::State => vec![Response::State(StateView::capture(&self.game))],
            Request::Dispatch {
                source,
                destination,
                units,
            } => {
                let result = self
                    .game
                    .dispatch_fleet(Side::Player, PlanetId(source), PlanetId(destination), units);
                vec![ack_or_error(result, name)]
            }
            Request::Ability { ability, target } => {
                let result = self
                    .game
                    .activate_ability(Side::Player, ability, target.map(PlanetId));
                vec![ack_or_error(result, name)]
            }
            Request::Hash => vec![Response::StateHash {
                elapsed_secs: self.game.elapsed_secs(),
                hash: self.game.state_hash(),
            }],
            Request::Quit => {
                self.finished = true;
                vec![Response::Bye]
            }
        };

        if self.game.is_terminal() && !self.game_over_sent && !self.finished {
            self.game_over_sent = true;
            let result = MatchOutcome::from_status(self.game.status());
            info!(?result, elapsed_secs = self.game.elapsed_secs(), "Session match over");
            responses.push(Response::GameOver {
                result,
                elapsed_secs: self.game.elapsed_secs(),
                score: self.game.final_score(),
            });
        }
        responses
    }

    /// Read requests from `input` until `quit` or end of input, writing
    /// responses to `output`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write!(output, "{}", Response::ready(self.game.planets().len()).to_json_line())?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let responses = match Request::from_json(line) {
                Ok(request) => self.handle(request),
                Err(e) => vec![Response::error(format!("Parse error: {e}"), None)],
            };
            for response in responses {
                write!(output, "{}", response.to_json_line())?;
            }
            output.flush()?;
            if self.finished {
                return Ok(());
            }
        }

        write!(output, "{}", Response::Bye.to_json_line())?;
        output.flush()
    }
}

fn ack_or_error<E: std::fmt::Display>(result: Result<(), E>, cmd: &str) -> Response {
    match result {
        Ok(()) => Response::ack(cmd),
        Err(reason) => Response::error(reason.to_string(), Some(cmd)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::entities::Owner;

    fn session() -> Session {
        let planets = vec![
            pw_core::entities::Planet::new(
                PlanetId(0),
                pw_core::math::Vec2Fixed::from_ints(100, 400),
                40,
                Owner::Player,
                50,
            ),
            pw_core::entities::Planet::new(
                PlanetId(1),
                pw_core::math::Vec2Fixed::from_ints(500, 400),
                40,
                Owner::Ai,
                5,
            ),
        ];
        let rules = pw_core::config::BalanceTuning::default().to_rules().unwrap();
        Session::new(Match::from_planets(planets, rules).unwrap(), 0.1)
    }

    #[test]
    fn test_dispatch_ack_and_rejection() {
        let mut session = session();
        let ok = session.handle(Request::Dispatch {
            source: 0,
            destination: 1,
            units: 10,
        });
        assert_eq!(ok, vec![Response::ack("dispatch")]);

        let err = session.handle(Request::Dispatch {
            source: 1,
            destination: 0,
            units: 1,
        });
        assert!(matches!(&err[0], Response::Error { cmd: Some(cmd), .. } if cmd == "dispatch"));
    }

    #[test]
    fn test_tick_reports_events_then_game_over() {
        let mut session = session();
        session.handle(Request::Dispatch {
            source: 0,
            destination: 1,
            units: 40,
        });
        let responses = session.handle(Request::Tick { count: 100 });
        assert!(matches!(&responses[0], Response::Events { events, .. } if !events.is_empty()));
        assert!(matches!(
            responses.last(),
            Some(Response::GameOver {
                result: MatchOutcome::Victory,
                ..
            })
        ));

        // Game over is reported once.
        let again = session.handle(Request::Tick { count: 1 });
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn test_run_over_lines() {
        let mut session = session();
        let input = "{\"cmd\":\"hash\"}\nnot json\n\n{\"cmd\":\"quit\"}\n{\"cmd\":\"state\"}\n";
        let mut output = Vec::new();
        session.run(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("\"ready\""));
        assert!(lines[1].contains("\"state_hash\""));
        assert!(lines[2].contains("Parse error"));
        assert!(lines[3].contains("\"bye\""));
        assert!(session.is_finished());
    }

    #[test]
    fn test_state_view() {
        let mut session = session();
        let responses = session.handle(Request::State);
        let Response::State(view) = &responses[0] else {
            panic!("expected state");
        };
        assert_eq!(view.planets.len(), 2);
        assert_eq!(view.player.planets, 1);
        assert!(view.fleets.is_empty());
    }
}
