//! UCI command parsing.

use arrocco::uci::{parse_command, GoParams, UciCommand};

#[test]
fn simple_commands() {
    assert_eq!(parse_command("uci"), UciCommand::Uci);
    assert_eq!(parse_command("isready"), UciCommand::IsReady);
    assert_eq!(parse_command("ucinewgame"), UciCommand::UciNewGame);
    assert_eq!(parse_command("stop"), UciCommand::Stop);
    assert_eq!(parse_command("quit"), UciCommand::Quit);
    assert_eq!(parse_command("  isready  "), UciCommand::IsReady);
}

#[test]
fn position_startpos() {
    assert_eq!(
        parse_command("position startpos"),
        UciCommand::Position {
            fen: None,
            moves: vec![]
        }
    );
    assert_eq!(
        parse_command("position startpos moves e2e4 e7e5"),
        UciCommand::Position {
            fen: None,
            moves: vec!["e2e4".into(), "e7e5".into()]
        }
    );
}

#[test]
fn position_fen() {
    let cmd = parse_command(
        "position fen r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 4 20 moves e1g1",
    );
    assert_eq!(
        cmd,
        UciCommand::Position {
            fen: Some("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 4 20".into()),
            moves: vec!["e1g1".into()]
        }
    );

    let cmd = parse_command("position fen 4k3/8/8/8/8/8/8/4K3 b - - 0 1");
    assert_eq!(
        cmd,
        UciCommand::Position {
            fen: Some("4k3/8/8/8/8/8/8/4K3 b - - 0 1".into()),
            moves: vec![]
        }
    );
}

#[test]
fn go_with_clocks() {
    let cmd = parse_command("go wtime 300000 btime 300000 winc 2000 binc 2000 movestogo 40");
    assert_eq!(
        cmd,
        UciCommand::Go(GoParams {
            wtime: Some(300000),
            btime: Some(300000),
            winc: Some(2000),
            binc: Some(2000),
            movestogo: Some(40),
            ..Default::default()
        })
    );
}

#[test]
fn go_variants() {
    assert_eq!(
        parse_command("go infinite"),
        UciCommand::Go(GoParams {
            infinite: true,
            ..Default::default()
        })
    );
    assert_eq!(
        parse_command("go depth 12"),
        UciCommand::Go(GoParams {
            depth: Some(12),
            ..Default::default()
        })
    );
    assert_eq!(
        parse_command("go nodes 500000"),
        UciCommand::Go(GoParams {
            nodes: Some(500000),
            ..Default::default()
        })
    );
    assert_eq!(
        parse_command("go movetime 2500"),
        UciCommand::Go(GoParams {
            movetime: Some(2500),
            ..Default::default()
        })
    );
}

#[test]
fn debug_commands() {
    assert_eq!(parse_command("perft 5"), UciCommand::Perft(5));
    assert_eq!(parse_command("eval"), UciCommand::Eval);
    assert_eq!(parse_command("d"), UciCommand::Display);
    assert!(matches!(parse_command("perft"), UciCommand::Unknown(_)));
    assert!(matches!(parse_command("perft x"), UciCommand::Unknown(_)));
}

#[test]
fn unknown_commands() {
    assert!(matches!(parse_command("xyzzy"), UciCommand::Unknown(_)));
    assert!(matches!(parse_command(""), UciCommand::Unknown(_)));
}
