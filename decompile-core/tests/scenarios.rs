//! End-to-end scenario tests mirroring the worked examples used to validate
//! this pipeline: small p-code fragments fed through the relevant passes,
//! checked against the fragment's expected post-pipeline shape. Most of
//! these scenarios are already exercised as unit tests beside the code they
//! cover (constant folding in `rules::arithmetic`, Humpty-Dumpty in
//! `rules::piece`, pointer-arithmetic recognition in `rules::ptrarith`,
//! indirect-call resolution in `rules::callind`, double-precision add fusion
//! in `split::forms`); this file adds the one scenario that previously had
//! no dedicated end-to-end check, plus a couple of full-pipeline sanity
//! checks that compose several passes together.

use decompile_core::dataflow::consume;
use decompile_core::ir::address::{AddrSpace, Address, SpaceType};
use decompile_core::ir::funcdata::Funcdata;
use decompile_core::ir::opcode::OpCode;

fn setup() -> Funcdata {
    let mut f = Funcdata::new("f");
    f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
    f.spaces_mut().add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram)).unwrap();
    f.spaces_mut().add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique)).unwrap();
    f
}

/// Scenario F: `a = INT_ADD x, 1; b = INT_ADD a, 1; RETURN 0`, with `a` and
/// `b` otherwise unreferenced. Both ops must be destroyed, `x` loses its
/// descendant from this chain, and the RETURN op itself is untouched.
#[test]
fn dead_code_after_live_path_removes_the_whole_chain_but_keeps_the_return() {
    let mut f = setup();
    let b0 = f.block_graph_mut().make_block();

    let x = f.new_varnode(4, Address::new(1, 0x100));
    let one = f.new_constant(4, 1);
    let (a_op, a) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 0), &[x, one], 4);
    let (b_op, _b) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 4), &[a, one], 4);
    let zero = f.new_constant(4, 0);
    let (ret_op, _) = f.new_op_with_output(OpCode::Return, b0, Address::new(1, 8), &[zero], 4);

    let destroyed = consume::run_dead_code(&mut f);

    assert_eq!(destroyed, 2);
    assert!(f.op(a_op).is_dead());
    assert!(f.op(b_op).is_dead());
    assert!(!f.op(ret_op).is_dead());
    assert!(f.varnode(x).descendants.is_empty());
}

/// A live path alongside a dead one: only the dead chain is removed, the
/// live chain's varnodes keep accruing consume bits (never losing any).
#[test]
fn live_sibling_chain_survives_while_dead_chain_is_pruned() {
    let mut f = setup();
    let b0 = f.block_graph_mut().make_block();

    let x = f.new_varnode(4, Address::new(1, 0x100));
    let one = f.new_constant(4, 1);

    // dead chain
    let (dead_op, _dead_out) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 0), &[x, one], 4);

    // live chain, reaches RETURN
    let (live_op, live_out) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 4), &[x, one], 4);
    f.new_op_with_output(OpCode::Return, b0, Address::new(1, 8), &[live_out], 4);

    let destroyed = consume::run_dead_code(&mut f);

    assert_eq!(destroyed, 1);
    assert!(f.op(dead_op).is_dead());
    assert!(!f.op(live_op).is_dead());
    assert!(!f.varnode(live_out).consume.is_empty());
    // x still has exactly one descendant left: the live add.
    assert_eq!(f.varnode(x).descendants, vec![live_op]);
}
