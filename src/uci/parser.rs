//! UCI command parser.

use crate::types::Depth;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movetime: Option<u64>,
    pub depth: Option<Depth>,
    pub nodes: Option<u64>,
    pub movestogo: Option<u32>,
    pub infinite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go(GoParams),
    Stop,
    Quit,
    /// Debug helpers inherited from the console interface.
    Perft(Depth),
    Eval,
    Display,
    Unknown(String),
}

/// Parses a single UCI input line.
pub fn parse_command(line: &str) -> UciCommand {
    let mut tokens = line.split_whitespace();
    let Some(head) = tokens.next() else {
        return UciCommand::Unknown(String::new());
    };

    match head {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "stop" => UciCommand::Stop,
        "quit" => UciCommand::Quit,
        "eval" => UciCommand::Eval,
        "d" => UciCommand::Display,
        "perft" => {
            let depth = tokens.next().and_then(|t| t.parse::<Depth>().ok());
            match depth {
                Some(d) if d > 0 => UciCommand::Perft(d),
                _ => UciCommand::Unknown(line.trim().to_string()),
            }
        }
        "position" => parse_position(tokens),
        "go" => parse_go(tokens),
        _ => UciCommand::Unknown(line.trim().to_string()),
    }
}

fn parse_position<'a>(mut tokens: impl Iterator<Item = &'a str>) -> UciCommand {
    let fen = match tokens.next() {
        Some("startpos") => None,
        Some("fen") => {
            // The FEN spans up to six tokens, ending at "moves" or the line.
            let mut parts = Vec::new();
            let mut moves_follow = false;
            while let Some(token) = tokens.next() {
                if token == "moves" {
                    moves_follow = true;
                    break;
                }
                parts.push(token);
            }
            let moves = if moves_follow {
                tokens.map(str::to_string).collect()
            } else {
                Vec::new()
            };
            return UciCommand::Position {
                fen: Some(parts.join(" ")),
                moves,
            };
        }
        _ => return UciCommand::Unknown("position".to_string()),
    };

    let moves = match tokens.next() {
        Some("moves") => tokens.map(str::to_string).collect(),
        _ => Vec::new(),
    };

    UciCommand::Position { fen, moves }
}

fn parse_go<'a>(mut tokens: impl Iterator<Item = &'a str>) -> UciCommand {
    let mut params = GoParams::default();

    while let Some(token) = tokens.next() {
        match token {
            "infinite" => params.infinite = true,
            "wtime" => params.wtime = tokens.next().and_then(|t| t.parse().ok()),
            "btime" => params.btime = tokens.next().and_then(|t| t.parse().ok()),
            "winc" => params.winc = tokens.next().and_then(|t| t.parse().ok()),
            "binc" => params.binc = tokens.next().and_then(|t| t.parse().ok()),
            "movetime" => params.movetime = tokens.next().and_then(|t| t.parse().ok()),
            "depth" => params.depth = tokens.next().and_then(|t| t.parse().ok()),
            "nodes" => params.nodes = tokens.next().and_then(|t| t.parse().ok()),
            "movestogo" => params.movestogo = tokens.next().and_then(|t| t.parse().ok()),
            _ => {}
        }
    }

    UciCommand::Go(params)
}
