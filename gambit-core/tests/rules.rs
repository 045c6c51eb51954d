//! Rules engine behaviour through the public API

use gambit_core::{
    evaluate, CastleSide, Color, PieceKind, Position, RuleError, Square, Status,
};

fn sq(name: &str) -> Square {
    Square::from_algebraic(name).unwrap()
}

fn play(pos: &mut Position, from: &str, to: &str) {
    pos.apply_move(sq(from), sq(to), None).unwrap();
}

#[test]
fn test_clone_isolation() {
    let pos = Position::new_game();
    for mv in pos.legal_moves(Color::Light) {
        let mut copy = pos.clone();
        copy.apply_move(mv.from, mv.to, mv.promotion).unwrap();
        assert_eq!(pos, Position::new_game());
        assert_ne!(copy, pos);
    }
}

#[test]
fn test_scholars_mate() {
    let mut pos = Position::new_game();
    play(&mut pos, "e2", "e4");
    play(&mut pos, "e7", "e5");
    play(&mut pos, "f1", "c4");
    play(&mut pos, "b8", "c6");
    play(&mut pos, "d1", "h5");
    play(&mut pos, "g8", "f6");
    assert_eq!(pos.status(), Status::Active);

    let outcome = pos.apply_move(sq("h5"), sq("f7"), None).unwrap();
    assert!(outcome.is_checkmate);
    assert_eq!(outcome.captured.map(|p| p.kind), Some(PieceKind::Pawn));
    assert_eq!(pos.status(), Status::Checkmate);
    assert!(pos.legal_moves(Color::Dark).is_empty());

    // Nothing moves after mate
    assert!(matches!(
        pos.apply_move(sq("e8"), sq("e7"), None),
        Err(RuleError::IllegalMove { .. })
    ));
}

#[test]
fn test_stalemate_scores_zero() {
    let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(pos.status(), Status::Stalemate);
    assert!(pos.legal_moves(Color::Dark).is_empty());
    assert_eq!(evaluate(&pos), 0);
}

#[test]
fn test_en_passant_window() {
    let mut pos = Position::new_game();
    play(&mut pos, "e2", "e4");
    play(&mut pos, "a7", "a6");
    play(&mut pos, "e4", "e5");
    play(&mut pos, "d7", "d5");
    assert_eq!(pos.en_passant_target(), Some(sq("d6")));

    let outcome = pos.apply_move(sq("e5"), sq("d6"), None).unwrap();
    assert!(outcome.mv.en_passant);
    assert_eq!(pos.piece_at(sq("d5")), None);
    assert_eq!(pos.piece_at(sq("d6")).map(|p| p.kind), Some(PieceKind::Pawn));
}

#[test]
fn test_en_passant_lost_after_other_move() {
    let mut pos = Position::new_game();
    play(&mut pos, "e2", "e4");
    play(&mut pos, "a7", "a6");
    play(&mut pos, "e4", "e5");
    play(&mut pos, "d7", "d5");
    play(&mut pos, "h2", "h3");
    play(&mut pos, "h7", "h6");
    assert!(pos.apply_move(sq("e5"), sq("d6"), None).is_err());
}

#[test]
fn test_castling_through_attack_refused() {
    // Dark bishop on c4 covers f1
    let pos = Position::from_fen("4k3/8/8/8/2b5/8/8/4K2R w K - 0 1").unwrap();
    assert!(pos
        .legal_moves_from(sq("e1"))
        .iter()
        .all(|m| m.castling.is_none()));
}

#[test]
fn test_castling_clears_both_rights() {
    let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let outcome = pos.apply_move(sq("e1"), sq("c1"), None).unwrap();
    assert_eq!(outcome.mv.castling, Some(CastleSide::Queenside));
    assert_eq!(pos.piece_at(sq("d1")).map(|p| p.kind), Some(PieceKind::Rook));

    let rights = pos.castling_rights();
    assert!(!rights.has(Color::Light, CastleSide::Kingside));
    assert!(!rights.has(Color::Light, CastleSide::Queenside));
    assert!(rights.has(Color::Dark, CastleSide::Kingside));
}

#[test]
fn test_underpromotion() {
    let mut pos = Position::from_fen("7k/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    pos.apply_move(sq("b7"), sq("b8"), Some(PieceKind::Knight)).unwrap();
    assert_eq!(pos.piece_at(sq("b8")).map(|p| p.kind), Some(PieceKind::Knight));
}

#[test]
fn test_wrong_side_reported_before_legality() {
    let mut pos = Position::new_game();
    assert!(matches!(
        pos.apply_move(sq("e7"), sq("e5"), None),
        Err(RuleError::WrongSideToMove { .. })
    ));
}
