//! End-to-end tests of the binding analyses.
//!
//! Each test lowers a small Python function by hand into a control flow graph
//! through the public builder API, then checks the liveness, definedness and
//! phi answers a code generator would ask for.

use bindscope::{
    analysis::{
        analyze_functions, compute_liveness_info, compute_required_phis, dataflow::MeetSemiLattice,
        DefinednessAnalysis, DefinitionLevel, FunctionAnalysis, FunctionUnit, LiveNames,
    },
    ast::{Alias, Arguments, Expr, Stmt},
    cfg::{BlockId, CfgBlock, CfgBuilder, ControlFlowGraph, ValidationConfig},
    scope::{DeclaredGlobals, LocalOnly},
    Error, Result,
};

fn assign(name: &str) -> Stmt {
    Stmt::assign(Expr::name(name), Expr::int(1))
}

fn read(name: &str) -> Stmt {
    Stmt::expr(Expr::name(name))
}

/// B0 assigns `x` and branches to B1 (assigns `y`) and B2; both flow into B3,
/// which falls through to B4 holding `tail`.
fn branch_and_join(tail: Vec<Stmt>) -> Result<ControlFlowGraph> {
    let mut builder = CfgBuilder::new();
    let b0 = builder.add_block_with(vec![assign("x")]);
    let b1 = builder.add_block_with(vec![assign("y")]);
    let b2 = builder.add_block();
    let b3 = builder.add_block();
    let b4 = builder.add_block_with(tail);
    builder.push(b0, Stmt::branch(Expr::name("c"), b1, b2));
    builder.push(b1, Stmt::jump(b3)).push(b2, Stmt::jump(b3));
    builder
        .add_edge(b0, b1)
        .add_edge(b0, b2)
        .add_edge(b1, b3)
        .add_edge(b2, b3)
        .add_edge(b3, b4);
    builder.build()
}

#[test]
fn test_branch_join_scenario() -> Result<()> {
    let cfg = branch_and_join(vec![Stmt::ret(Some(Expr::name("y")))])?;
    let args = Arguments::positional(["c"]);
    let liveness = compute_liveness_info(&cfg);
    let phis = compute_required_phis(&args, &cfg, &liveness, &LocalOnly);

    let b3 = BlockId::new(3);
    let definedness = phis.definedness();
    assert_eq!(definedness.is_defined_at("x", b3), DefinitionLevel::Defined);
    assert_eq!(
        definedness.is_defined_at("y", b3),
        DefinitionLevel::PotentiallyDefined
    );
    assert_eq!(definedness.is_defined_at("c", b3), DefinitionLevel::Defined);

    assert!(phis.is_required("y", b3));
    assert!(!phis.is_required("x", b3));
    assert!(!phis.is_required("c", b3));

    assert!(phis.is_potentially_undefined_after("y", BlockId::new(2)));
    assert!(!phis.is_potentially_undefined_after("x", BlockId::new(2)));
    Ok(())
}

#[test]
fn test_phi_for_both_names_when_both_read() -> Result<()> {
    let cfg = branch_and_join(vec![Stmt::ret(Some(Expr::add(
        Expr::name("x"),
        Expr::name("y"),
    )))])?;
    let liveness = compute_liveness_info(&cfg);
    let phis = compute_required_phis(&Arguments::default(), &cfg, &liveness, &LocalOnly);

    let required: Vec<&str> = phis
        .required_phis(BlockId::new(3))
        .expect("b3 is a merge block")
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(required, vec!["x", "y"]);
    assert_eq!(
        phis.get_all_required_after(BlockId::new(1)),
        phis.get_all_required_after(BlockId::new(2))
    );
    Ok(())
}

#[test]
fn test_never_assigned_name_is_undefined_everywhere() -> Result<()> {
    let cfg = branch_and_join(vec![read("print")])?;
    let definedness = DefinednessAnalysis::new(&Arguments::default(), &cfg, &LocalOnly);

    for block in cfg.blocks() {
        assert_eq!(
            definedness.is_defined_at("print", block.id),
            DefinitionLevel::Undefined
        );
        assert_eq!(
            definedness.is_defined_at_end("print", block.id),
            DefinitionLevel::Undefined
        );
    }
    Ok(())
}

#[test]
fn test_all_parameter_kinds_defined_at_entry() -> Result<()> {
    let mut builder = CfgBuilder::new();
    builder.add_block_with(vec![Stmt::ret(None)]);
    let cfg = builder.build()?;

    let args = Arguments::positional(["a", "b"])
        .with_vararg("rest")
        .with_kwarg("options");
    let definedness = DefinednessAnalysis::new(&args, &cfg, &LocalOnly);

    for name in ["a", "b", "rest", "options"] {
        assert_eq!(
            definedness.is_defined_at(name, cfg.entry()),
            DefinitionLevel::Defined,
            "{name}"
        );
    }
    Ok(())
}

#[test]
fn test_exit_blocks_have_nothing_live() -> Result<()> {
    let cfg = branch_and_join(vec![read("x")])?;
    let liveness = compute_liveness_info(&cfg);
    for &exit in cfg.exits() {
        assert!(!liveness.is_live_at_end("x", exit));
        assert!(!liveness.is_live_at_end("y", exit));
    }
    Ok(())
}

#[test]
fn test_required_after_false_at_branch_points() -> Result<()> {
    let cfg = branch_and_join(vec![read("y")])?;
    let liveness = compute_liveness_info(&cfg);
    let phis = compute_required_phis(&Arguments::default(), &cfg, &liveness, &LocalOnly);

    for block in cfg.blocks().iter().filter(|b| b.successors.len() > 1) {
        assert!(!phis.is_required_after("y", block.id));
        assert!(!phis.is_required_after("x", block.id));
    }
    assert!(phis.is_required_after("y", BlockId::new(1)));
    Ok(())
}

#[test]
fn test_only_merge_blocks_hold_phis() -> Result<()> {
    let cfg = branch_and_join(vec![read("x"), read("y")])?;
    let liveness = compute_liveness_info(&cfg);
    let phis = compute_required_phis(&Arguments::default(), &cfg, &liveness, &LocalOnly);

    for block in cfg.blocks() {
        let recorded = phis.required_phis(block.id);
        if block.predecessors.len() < 2 {
            assert!(recorded.is_none(), "{} recorded phis", block.id);
        } else {
            let recorded = recorded.expect("merge block recorded");
            assert!(recorded.is_subset(phis.get_all_defined_at(block.id)));
        }
    }
    Ok(())
}

#[test]
fn test_definedness_is_deterministic() -> Result<()> {
    let cfg = branch_and_join(vec![read("y")])?;
    let args = Arguments::positional(["c"]);
    let first = DefinednessAnalysis::new(&args, &cfg, &LocalOnly);
    let second = DefinednessAnalysis::new(&args, &cfg, &LocalOnly);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_while_loop_with_conditional_binding() -> Result<()> {
    // def f(n):
    //     i = 0
    //     while i < n:
    //         if i:
    //             last = i
    //         i = i + 1
    //     return last
    let mut builder = CfgBuilder::new();
    let entry = builder.add_block_with(vec![assign("i")]);
    let header = builder.add_block();
    let test = builder.add_block();
    let bind = builder.add_block_with(vec![Stmt::assign(Expr::name("last"), Expr::name("i"))]);
    let step = builder.add_block_with(vec![Stmt::assign(
        Expr::name("i"),
        Expr::add(Expr::name("i"), Expr::int(1)),
    )]);
    let exit = builder.add_block_with(vec![Stmt::ret(Some(Expr::name("last")))]);
    builder.push(
        header,
        Stmt::branch(Expr::lt(Expr::name("i"), Expr::name("n")), test, exit),
    );
    builder.push(test, Stmt::branch(Expr::name("i"), bind, step));
    builder
        .add_edge(entry, header)
        .add_edge(header, test)
        .add_edge(header, exit)
        .add_edge(test, bind)
        .add_edge(test, step)
        .add_edge(bind, step)
        .add_edge(step, header);
    let cfg = builder.build()?;

    let unit = FunctionUnit::new("f", Arguments::positional(["n"]), cfg);
    let analysis = FunctionAnalysis::compute(&unit);
    let definedness = analysis.definedness();
    let phis = analysis.phis();

    assert_eq!(definedness.is_defined_at("i", header), DefinitionLevel::Defined);
    assert_eq!(
        definedness.is_defined_at("last", header),
        DefinitionLevel::PotentiallyDefined
    );
    assert_eq!(
        definedness.is_defined_at("last", exit),
        DefinitionLevel::PotentiallyDefined
    );
    assert_eq!(
        definedness.is_defined_at_end("last", bind),
        DefinitionLevel::Defined
    );

    assert!(phis.is_required("i", header));
    assert!(phis.is_required("last", header));
    assert!(phis.is_required("last", step));
    assert!(!phis.is_required("i", exit));
    assert!(phis.is_potentially_undefined_after("last", header));
    Ok(())
}

#[test]
fn test_imports_and_definitions_bind() -> Result<()> {
    // if c:
    //     import os.path
    //     from json import loads as parse
    //     def helper(): pass
    // use(os, parse, helper)
    let mut builder = CfgBuilder::new();
    let entry = builder.add_block();
    let then = builder.add_block_with(vec![
        Stmt::import(vec![Alias::new("os.path")]),
        Stmt::import_from("json", vec![Alias::renamed("loads", "parse")]),
        Stmt::function_def("helper", Arguments::default(), vec![Stmt::pass()]),
    ]);
    let join = builder.add_block_with(vec![Stmt::expr(Expr::call(
        Expr::name("use"),
        vec![Expr::name("os"), Expr::name("parse"), Expr::name("helper")],
    ))]);
    builder.add_edge(entry, then).add_edge(entry, join).add_edge(then, join);
    let cfg = builder.build()?;

    let liveness = compute_liveness_info(&cfg);
    let phis = compute_required_phis(&Arguments::default(), &cfg, &liveness, &LocalOnly);

    for name in ["os", "parse", "helper"] {
        assert!(phis.is_required(name, join), "{name}");
    }
    assert!(!phis.get_all_defined_at(join).contains("os.path"));
    assert!(!phis.get_all_defined_at(join).contains("loads"));
    Ok(())
}

#[test]
fn test_attribute_and_subscript_targets_do_not_bind() -> Result<()> {
    let mut builder = CfgBuilder::new();
    let entry = builder.add_block();
    let then = builder.add_block_with(vec![
        Stmt::assign(Expr::attribute(Expr::name("obj"), "field"), Expr::int(1)),
        Stmt::assign(
            Expr::subscript(Expr::name("items"), Expr::int(0)),
            Expr::int(2),
        ),
    ]);
    let join = builder.add_block_with(vec![read("obj"), read("items")]);
    builder.add_edge(entry, then).add_edge(entry, join).add_edge(then, join);
    let cfg = builder.build()?;

    let liveness = compute_liveness_info(&cfg);
    let phis = compute_required_phis(&Arguments::default(), &cfg, &liveness, &LocalOnly);

    assert!(phis.get_all_defined_at(join).is_empty());
    assert!(!phis.is_required("obj", join));
    assert!(liveness.is_live_at_end("obj", entry));
    Ok(())
}

#[test]
fn test_global_declarations_are_excluded() -> Result<()> {
    let mut builder = CfgBuilder::new();
    let entry = builder.add_block_with(vec![Stmt::global(["counter"])]);
    let then = builder.add_block_with(vec![assign("counter"), assign("local")]);
    let join = builder.add_block_with(vec![read("counter"), read("local")]);
    builder.add_edge(entry, then).add_edge(entry, join).add_edge(then, join);
    let cfg = builder.build()?;

    let scope = DeclaredGlobals::from_cfg(&cfg);
    let liveness = compute_liveness_info(&cfg);
    let phis = compute_required_phis(&Arguments::default(), &cfg, &liveness, &scope);

    assert!(!phis.is_required("counter", join));
    assert!(phis.is_required("local", join));

    let closure_scope = |name: &str| name == "local";
    let phis = compute_required_phis(&Arguments::default(), &cfg, &liveness, &closure_scope);
    assert!(phis.is_required("counter", join));
    assert!(!phis.is_required("local", join));
    Ok(())
}

#[test]
fn test_nested_bodies_are_separate_scopes() -> Result<()> {
    // def outer():
    //     def inner(): y = 1
    //     return y
    let mut builder = CfgBuilder::new();
    builder.add_block_with(vec![
        Stmt::function_def("inner", Arguments::default(), vec![assign("y")]),
        Stmt::ret(Some(Expr::name("y"))),
    ]);
    let cfg = builder.build()?;

    let definedness = DefinednessAnalysis::new(&Arguments::default(), &cfg, &LocalOnly);
    let entry = cfg.entry();
    assert_eq!(
        definedness.is_defined_at_end("inner", entry),
        DefinitionLevel::Defined
    );
    assert_eq!(
        definedness.is_defined_at_end("y", entry),
        DefinitionLevel::Undefined
    );
    Ok(())
}

#[test]
fn test_unreachable_block_does_not_weaken_merge() -> Result<()> {
    // b0 (x = 1) -> b2, b1 (dead, no binding) -> b2
    let mut builder = CfgBuilder::new();
    let b0 = builder.add_block_with(vec![assign("x")]);
    let b1 = builder.add_block();
    let b2 = builder.add_block_with(vec![read("x")]);
    builder.add_edge(b0, b2).add_edge(b1, b2);
    let cfg = builder.build()?;

    let definedness = DefinednessAnalysis::new(&Arguments::default(), &cfg, &LocalOnly);
    assert_eq!(definedness.is_defined_at("x", b2), DefinitionLevel::Defined);
    assert!(!definedness.state_at(b1).is_reached());
    Ok(())
}

#[test]
fn test_live_names_agree_with_queries() -> Result<()> {
    let cfg = branch_and_join(vec![read("x"), assign("y"), read("y")])?;
    let liveness = compute_liveness_info(&cfg);
    let results = LiveNames::new(&cfg).solve(&cfg);

    for block in cfg.blocks() {
        let live_out = results.out_state(block.id).expect("block exists");
        for name in ["c", "x", "y"] {
            assert_eq!(
                live_out.contains(name),
                liveness.is_live_at_end(name, block.id),
                "{name} at {}",
                block.id
            );
        }
    }
    Ok(())
}

#[test]
fn test_batch_matches_sequential() -> Result<()> {
    let units = vec![
        FunctionUnit::new("first", Arguments::default(), branch_and_join(vec![read("y")])?),
        FunctionUnit::new("second", Arguments::default(), branch_and_join(vec![read("x")])?)
            .with_scope(DeclaredGlobals::new(["x"])),
    ];

    let batch = analyze_functions(&units);
    for (unit, parallel) in units.iter().zip(&batch) {
        let sequential = FunctionAnalysis::compute(unit);
        assert_eq!(parallel.name(), unit.name);
        assert_eq!(parallel.definedness(), sequential.definedness());
        let merges: Vec<_> = parallel.phis().merge_blocks().collect();
        assert_eq!(merges, sequential.phis().merge_blocks().collect::<Vec<_>>());
    }

    assert!(batch[0].phis().is_required("y", BlockId::new(3)));
    assert!(!batch[1].phis().is_required("x", BlockId::new(3)));
    Ok(())
}

#[test]
fn test_graph_validation_errors() {
    assert!(matches!(ControlFlowGraph::from_blocks(Vec::new()), Err(Error::Empty)));

    // Successor without the mirrored predecessor.
    let mut b0 = CfgBlock::new(BlockId::new(0));
    b0.successors.push(BlockId::new(1));
    let b1 = CfgBlock::new(BlockId::new(1));
    assert!(matches!(
        ControlFlowGraph::from_blocks(vec![b0.clone(), b1.clone()]),
        Err(Error::GraphError(_))
    ));
    assert!(ControlFlowGraph::from_blocks_with_config(vec![b0, b1], ValidationConfig::disabled()).is_ok());

    // Every block in a cycle: no exit.
    let mut builder = CfgBuilder::new();
    let a = builder.add_block();
    let b = builder.add_block();
    builder.add_edge(a, b).add_edge(b, b);
    assert!(matches!(builder.build(), Err(Error::Malformed { .. })));
}

#[test]
fn test_states_meet_like_levels() {
    let left = DefinednessAnalysis::new(
        &Arguments::positional(["a"]),
        &branch_and_join(vec![]).expect("valid graph"),
        &LocalOnly,
    );
    let state = left.state_at_end(BlockId::new(1));
    assert_eq!(state.meet(state), state.clone());
    assert_eq!(state.level("y"), DefinitionLevel::Defined);
}
