use bumpalo::Bump;
use contractc::ast::{AstBuilder, BinaryOp, Program, Type};
use contractc::{
    CompilationError, CompileOptions, CompiledContract, Compiler, EncodedMethod, EncodingError,
    Error, OpCode, Syscall, decode,
};
use contractc_compiler::emit::{EncodedScript, verify::verify};
use num_bigint::BigInt;

fn compile_with(program: &Program<'_>, options: CompileOptions) -> CompiledContract {
    Compiler::new(options)
        .compile(program)
        .unwrap_or_else(|e| panic!("compilation failed: {e}"))
}

fn compile(program: &Program<'_>) -> CompiledContract {
    compile_with(program, CompileOptions::new("Test"))
}

fn method_bytes<'c>(contract: &'c CompiledContract, name: &str) -> &'c [u8] {
    let method: &EncodedMethod = contract
        .method(name)
        .unwrap_or_else(|| panic!("no method '{name}'"));
    &contract.script[method.start..method.end]
}

fn method_opcodes(contract: &CompiledContract, name: &str) -> Vec<OpCode> {
    decode(method_bytes(contract, name))
        .unwrap()
        .iter()
        .map(|i| i.opcode)
        .collect()
}

fn verify_contract(contract: &CompiledContract) {
    let encoded = EncodedScript {
        script: contract.script.clone(),
        methods: contract.methods.clone(),
    };
    verify(&encoded, contract.tokens.len()).unwrap();
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_decimals_is_push8_ret() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![ast.item(ast.function(
        "decimals",
        &[],
        Type::Integer,
        vec![ast.return_stmt(Some(ast.int(8)))],
    ))]);

    let contract = compile(&program);
    assert_eq!(contract.script, vec![OpCode::Push8 as u8, OpCode::Ret as u8]);

    let abi = &contract.manifest.abi;
    assert_eq!(abi.methods.len(), 1);
    assert_eq!(abi.methods[0].name, "decimals");
    assert_eq!(abi.methods[0].offset, 0);
}

#[test]
fn test_string_constant_is_pushdata1() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![
        ast.const_item("SYMBOL", Type::String, ast.string("TOKEN")),
        ast.item(ast.function(
            "symbol",
            &[],
            Type::String,
            vec![ast.return_stmt(Some(ast.var("SYMBOL", Type::String)))],
        )),
    ]);

    let contract = compile(&program);
    let mut expected = vec![OpCode::PushData1 as u8, 5];
    expected.extend_from_slice(b"TOKEN");
    expected.push(OpCode::Ret as u8);
    assert_eq!(contract.script, expected);
}

#[test]
fn test_syscall_property_is_one_syscall() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![
        ast.interface(
            "RuntimeApi",
            &[],
            vec![ast.property(
                "time",
                Type::Integer,
                &[("syscall", "System.Runtime.GetTime")],
            )],
        ),
        ast.declare("Runtime", "RuntimeApi"),
        ast.item(ast.function(
            "now",
            &[],
            Type::Integer,
            vec![ast.return_stmt(Some(ast.member(
                ast.var("Runtime", Type::Named("RuntimeApi")),
                "time",
                Type::Integer,
            )))],
        )),
    ]);

    let contract = compile(&program);
    let instructions = decode(&contract.script).unwrap();
    assert_eq!(instructions.len(), 2);
    assert_eq!(instructions[0].opcode, OpCode::Syscall);
    assert_eq!(
        instructions[0].operand_u32(),
        Some(Syscall::RuntimeGetTime.id())
    );
    assert_eq!(instructions[1].opcode, OpCode::Ret);
}

// ============================================================================
// Encoding properties
// ============================================================================

#[test]
fn test_integer_push_widths() {
    let cases: Vec<(BigInt, OpCode)> = vec![
        (BigInt::from(-1), OpCode::PushM1),
        (BigInt::from(0), OpCode::Push0),
        (BigInt::from(16), OpCode::Push16),
        (BigInt::from(17), OpCode::PushInt8),
        (BigInt::from(-2), OpCode::PushInt8),
        (BigInt::from(127), OpCode::PushInt8),
        (BigInt::from(128), OpCode::PushInt16),
        (BigInt::from(-129), OpCode::PushInt16),
        (BigInt::from(32_768), OpCode::PushInt32),
        (BigInt::from(1_i64 << 31), OpCode::PushInt64),
        (BigInt::from(i64::MIN), OpCode::PushInt64),
        (BigInt::from(1_u64 << 63), OpCode::PushInt128),
        (BigInt::from(1_u128 << 127), OpCode::PushInt256),
        (-(BigInt::from(1) << 255u32), OpCode::PushInt256),
    ];

    for (value, opcode) in cases {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(vec![ast.item(ast.function(
            "value",
            &[],
            Type::Integer,
            vec![ast.return_stmt(Some(ast.big(value.clone())))],
        ))]);

        let contract = compile(&program);
        let instructions = decode(&contract.script).unwrap();
        assert_eq!(instructions[0].opcode, opcode, "value {value}");
        assert_eq!(instructions[0].push_int(), Some(value.clone()), "value {value}");
    }
}

#[test]
fn test_compilation_is_idempotent() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![
        ast.static_item("counter", Type::Integer, Some(ast.int(1))),
        ast.item(ast.function(
            "bump",
            &[("by", Type::Integer)],
            Type::Integer,
            vec![
                ast.expr_stmt(ast.assign_op(
                    ast.var("counter", Type::Integer),
                    Some(BinaryOp::Add),
                    ast.var("by", Type::Integer),
                )),
                ast.return_stmt(Some(ast.var("counter", Type::Integer))),
            ],
        )),
    ]);

    let first = compile(&program);
    let second = compile(&program);
    assert_eq!(first.script, second.script);
    assert_eq!(first.hash, second.hash);
    assert_eq!(first.hash_hex(), second.hash_hex());
    assert_eq!(
        first.manifest_json().unwrap(),
        second.manifest_json().unwrap()
    );
}

#[test]
fn test_if_else_jump_lands_on_else_branch() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![ast.item(ast.function(
        "pick",
        &[("flag", Type::Boolean)],
        Type::Integer,
        vec![ast.if_stmt(
            ast.var("flag", Type::Boolean),
            ast.block(vec![ast.return_stmt(Some(ast.int(1)))]),
            Some(ast.block(vec![ast.return_stmt(Some(ast.int(2)))])),
        )],
    ))]);

    let contract = compile(&program);
    let instructions = decode(&contract.script).unwrap();
    let jump = instructions
        .iter()
        .find(|i| i.opcode == OpCode::JmpIfNotL)
        .unwrap();
    let target = jump.branch_targets()[0] as usize;
    let landed = instructions.iter().find(|i| i.address == target).unwrap();
    assert_eq!(landed.push_int(), Some(BigInt::from(2)));
    verify_contract(&contract);
}

#[test]
fn test_if_without_else_jumps_past_then_branch() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![ast.item(ast.function(
        "clamp",
        &[("flag", Type::Boolean)],
        Type::Integer,
        vec![
            ast.let_stmt("x", Type::Integer, Some(ast.int(0))),
            ast.if_stmt(
                ast.var("flag", Type::Boolean),
                ast.block(vec![ast.expr_stmt(
                    ast.assign(ast.var("x", Type::Integer), ast.int(5)),
                )]),
                None,
            ),
            ast.return_stmt(Some(ast.var("x", Type::Integer))),
        ],
    ))]);

    let contract = compile(&program);
    let instructions = decode(&contract.script).unwrap();
    let jump = instructions
        .iter()
        .position(|i| i.opcode == OpCode::JmpIfNotL)
        .unwrap();
    let target = instructions[jump].branch_targets()[0] as usize;
    let landed = instructions.iter().position(|i| i.address == target).unwrap();

    assert_eq!(instructions[landed].opcode, OpCode::LdLoc0);
    assert_eq!(instructions[landed - 1].opcode, OpCode::StLoc0);
    assert_eq!(instructions[landed - 2].opcode, OpCode::Push5);
}

#[test]
fn test_argument_slot_packing() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let params: Vec<(String, Type<'_>)> =
        (0..8).map(|i| (format!("p{i}"), Type::Integer)).collect();
    let params: Vec<(&str, Type<'_>)> = params.iter().map(|(n, t)| (n.as_str(), *t)).collect();

    let program = ast.program(vec![
        ast.item(ast.function(
            "sixth",
            &params,
            Type::Integer,
            vec![ast.return_stmt(Some(ast.var("p6", Type::Integer)))],
        )),
        ast.item(ast.function(
            "seventh",
            &params,
            Type::Integer,
            vec![ast.return_stmt(Some(ast.var("p7", Type::Integer)))],
        )),
    ]);

    let contract = compile(&program);

    let sixth = decode(method_bytes(&contract, "sixth")).unwrap();
    assert_eq!(sixth[0].opcode, OpCode::InitSlot);
    assert_eq!(sixth[0].operand, &[0, 8]);
    assert_eq!(sixth[1].opcode, OpCode::LdArg6);
    assert_eq!(sixth[1].size, 1);

    let seventh = decode(method_bytes(&contract, "seventh")).unwrap();
    assert_eq!(seventh[1].opcode, OpCode::LdArg);
    assert_eq!(seventh[1].size, 2);
    assert_eq!(seventh[1].operand, &[7]);
}

// ============================================================================
// Scopes and symbols
// ============================================================================

#[test]
fn test_local_shadows_outer_constant() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![
        ast.const_item("limit", Type::Integer, ast.int(10)),
        ast.item(ast.function(
            "inner",
            &[],
            Type::Integer,
            vec![ast.block(vec![
                ast.let_stmt("limit", Type::Integer, Some(ast.int(3))),
                ast.return_stmt(Some(ast.var("limit", Type::Integer))),
            ])],
        )),
        ast.item(ast.function(
            "outer",
            &[],
            Type::Integer,
            vec![ast.return_stmt(Some(ast.var("limit", Type::Integer)))],
        )),
    ]);

    let contract = compile(&program);
    assert_eq!(
        method_opcodes(&contract, "inner"),
        vec![
            OpCode::InitSlot,
            OpCode::Push3,
            OpCode::StLoc0,
            OpCode::LdLoc0,
            OpCode::Ret,
        ]
    );
    assert_eq!(
        method_opcodes(&contract, "outer"),
        vec![OpCode::Push10, OpCode::Ret]
    );
}

#[test]
fn test_method_tokens_deduplicate_across_functions() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let balance_of = |name: &str| {
        ast.item(ast.function(
            name,
            &[("account", Type::Hash160)],
            Type::Integer,
            vec![ast.return_stmt(Some(ast.call(
                ast.member(ast.var("NEO", Type::Named("NeoToken")), "balanceOf", Type::Any),
                vec![ast.var("account", Type::Hash160)],
                Type::Integer,
            )))],
        ))
    };
    let program = ast.program(vec![
        ast.interface(
            "NeoToken",
            &[("nativeContract", "NeoToken")],
            vec![ast.method("balanceOf", &[("account", Type::Hash160)], Type::Integer, &[])],
        ),
        ast.declare("NEO", "NeoToken"),
        balance_of("first"),
        balance_of("second"),
    ]);

    let contract = compile(&program);
    assert_eq!(contract.tokens.len(), 1);
    assert_eq!(contract.tokens[0].method, "balanceOf");
    assert_eq!(contract.tokens[0].param_count, 1);

    for name in ["first", "second"] {
        let instructions = decode(method_bytes(&contract, name)).unwrap();
        let call = instructions
            .iter()
            .find(|i| i.opcode == OpCode::CallT)
            .unwrap();
        assert_eq!(call.operand, &[0, 0]);
    }
    verify_contract(&contract);
}

#[test]
fn test_event_notifies_packed_arguments() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![
        ast.item(ast.declared_function(
            "onTransfer",
            &[("to", Type::Hash160), ("amount", Type::Integer)],
            Type::Void,
            &[("event", "Transfer")],
        )),
        ast.item(ast.function(
            "fire",
            &[("to", Type::Hash160)],
            Type::Void,
            vec![ast.expr_stmt(ast.call_fn(
                "onTransfer",
                vec![ast.var("to", Type::Hash160), ast.int(1)],
                Type::Void,
            ))],
        )),
    ]);

    let contract = compile(&program);
    assert_eq!(
        method_opcodes(&contract, "fire"),
        vec![
            OpCode::InitSlot,
            OpCode::Push1,
            OpCode::LdArg0,
            OpCode::Push2,
            OpCode::Pack,
            OpCode::PushData1,
            OpCode::Syscall,
            OpCode::Ret,
        ]
    );
    let events = &contract.manifest.abi.events;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Transfer");
    assert_eq!(events[0].parameters.len(), 2);
}

#[test]
fn test_statics_synthesize_initialize() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![
        ast.static_item("supply", Type::Integer, Some(ast.int(100))),
        ast.item(ast.function(
            "totalSupply",
            &[],
            Type::Integer,
            vec![ast.return_stmt(Some(ast.var("supply", Type::Integer)))],
        )),
    ]);

    let contract = compile(&program);
    assert_eq!(
        method_opcodes(&contract, "totalSupply"),
        vec![OpCode::LdSFld0, OpCode::Ret]
    );
    assert_eq!(
        method_opcodes(&contract, "_initialize"),
        vec![
            OpCode::InitSSlot,
            OpCode::PushInt8,
            OpCode::StSFld0,
            OpCode::Ret,
        ]
    );

    let initialize = contract.manifest.abi.method("_initialize").unwrap();
    assert_eq!(initialize.offset as usize, contract.method("_initialize").unwrap().start);

    let debug = contract.debug_info.as_ref().unwrap();
    assert_eq!(debug.static_variables.len(), 1);
}

#[test]
fn test_no_statics_no_initialize() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![ast.item(ast.function("main", &[], Type::Void, vec![]))]);

    let contract = compile(&program);
    assert!(contract.method("_initialize").is_none());
    assert!(contract.manifest.abi.method("_initialize").is_none());
}

// ============================================================================
// Loops and short branches
// ============================================================================

/// `let i = 0; while (true) { i += 1; if (i == n) break; if (i % 2 == 0) continue; } return i;`
fn counting_loop<'a>(ast: &AstBuilder<'a>) -> Program<'a> {
    let i = || ast.var("i", Type::Integer);
    ast.program(vec![ast.item(ast.function(
        "count",
        &[("n", Type::Integer)],
        Type::Integer,
        vec![
            ast.let_stmt("i", Type::Integer, Some(ast.int(0))),
            ast.while_stmt(
                ast.boolean(true),
                ast.block(vec![
                    ast.expr_stmt(ast.assign_op(i(), Some(BinaryOp::Add), ast.int(1))),
                    ast.if_stmt(
                        ast.binary(i(), BinaryOp::Equal, ast.var("n", Type::Integer), Type::Boolean),
                        ast.block(vec![ast.break_stmt()]),
                        None,
                    ),
                    ast.if_stmt(
                        ast.binary(
                            ast.binary(i(), BinaryOp::Mod, ast.int(2), Type::Integer),
                            BinaryOp::Equal,
                            ast.int(0),
                            Type::Boolean,
                        ),
                        ast.block(vec![ast.continue_stmt()]),
                        None,
                    ),
                ]),
            ),
            ast.return_stmt(Some(i())),
        ],
    ))])
}

#[test]
fn test_break_and_continue_targets() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = counting_loop(&ast);

    let contract = compile(&program);
    let instructions = decode(&contract.script).unwrap();
    let loop_start = instructions
        .iter()
        .find(|i| i.opcode == OpCode::PushT)
        .unwrap()
        .address;
    let jumps: Vec<_> = instructions
        .iter()
        .filter(|i| i.opcode == OpCode::JmpL)
        .collect();
    assert_eq!(jumps.len(), 3);
    let (brk, cont, back) = (jumps[0], jumps[1], jumps[2]);

    assert_eq!(cont.branch_targets(), vec![loop_start as i64]);
    assert_eq!(back.branch_targets(), vec![loop_start as i64]);
    assert_eq!(brk.branch_targets(), vec![back.next_address() as i64]);
    verify_contract(&contract);
}

#[test]
fn test_short_jumps_verify_and_never_grow() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = counting_loop(&ast);

    let long = compile(&program);
    let short = compile_with(&program, CompileOptions::new("Test").with_optimize(true));

    assert!(short.script.len() < long.script.len());
    verify_contract(&short);

    let opcodes: Vec<_> = decode(&short.script)
        .unwrap()
        .iter()
        .map(|i| i.opcode)
        .collect();
    assert!(!opcodes.contains(&OpCode::JmpL));
    assert!(opcodes.contains(&OpCode::Jmp));

    let method = &short.manifest.abi.methods[0];
    assert_eq!(method.offset, 0);
}

#[test]
fn test_try_catch_finally_verifies() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![ast.item(ast.function(
        "guarded",
        &[],
        Type::Integer,
        vec![
            ast.try_stmt(
                vec![ast.throw_stmt(ast.string("boom"))],
                Some((Some("e"), vec![ast.return_stmt(Some(ast.int(1)))])),
                Some(vec![ast.expr_stmt(ast.int(2))]),
            ),
            ast.return_stmt(Some(ast.int(0))),
        ],
    ))]);

    for optimize in [false, true] {
        let contract = compile_with(&program, CompileOptions::new("Test").with_optimize(optimize));
        let opcodes = method_opcodes(&contract, "guarded");
        assert!(opcodes.contains(&OpCode::EndFinally));
        assert!(opcodes.contains(&OpCode::Throw));
        verify_contract(&contract);
    }
}

// ============================================================================
// Artifacts and errors
// ============================================================================

#[test]
fn test_debug_info_maps_statements() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![ast.item(ast.function(
        "decimals",
        &[],
        Type::Integer,
        vec![ast.return_stmt(Some(ast.int(8)))],
    ))]);

    let contract = compile(&program);
    let debug = contract.debug_info.as_ref().unwrap();
    assert_eq!(debug.documents, vec!["contract.ts".to_string()]);
    assert_eq!(debug.hash, contract.hash);

    let method = debug.method("decimals").unwrap();
    assert_eq!(method.range.start, 0);
    assert_eq!(method.range.end, 1);
    assert!(!method.sequence_points.is_empty());
    assert!(method.sequence_points.iter().all(|p| p.address <= 1));

    let json = contract.debug_info_json().unwrap().unwrap();
    assert!(json.contains("decimals"));

    let plain = compile_with(&program, CompileOptions::new("Test").with_debug_info(false));
    assert!(plain.debug_info.is_none());
    assert!(plain.debug_info_json().is_none());
}

#[test]
fn test_manifest_json() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let mut decl = ast.function(
        "balance",
        &[("owner", Type::Hash160)],
        Type::Integer,
        vec![ast.return_stmt(Some(ast.int(0)))],
    );
    decl.is_safe = true;
    let program = ast.program(vec![ast.item(decl)]);

    let contract = compile_with(&program, CompileOptions::new("Vault"));
    let json: serde_json::Value = serde_json::from_str(&contract.manifest_json().unwrap()).unwrap();
    assert_eq!(json["name"], "Vault");
    let method = &json["abi"]["methods"][0];
    assert_eq!(method["name"], "balance");
    assert_eq!(method["safe"], true);
    assert_eq!(method["parameters"][0]["type"], "Hash160");
}

#[test]
fn test_errors_accumulate_within_a_pass() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = ast.program(vec![
        ast.item(ast.function(
            "a",
            &[],
            Type::Void,
            vec![ast.expr_stmt(ast.var("nowhere", Type::Integer))],
        )),
        ast.item(ast.function("b", &[], Type::Void, vec![ast.break_stmt()])),
        ast.item(ast.function("c", &[], Type::Void, vec![])),
    ]);

    let err = Compiler::new(CompileOptions::new("Broken"))
        .compile(&program)
        .unwrap_err();
    let diagnostics = err.diagnostics().unwrap();
    assert_eq!(diagnostics.len(), 2);
    assert!(matches!(err, Error::Compilation(_)));
    assert!(err.to_string().contains("nowhere"));
}

#[test]
fn test_encoding_errors_accumulate_per_function() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let huge = |name: &str| {
        ast.item(ast.function(
            name,
            &[],
            Type::Integer,
            vec![ast.return_stmt(Some(ast.big(BigInt::from(1) << 300u32)))],
        ))
    };
    let program = ast.program(vec![huge("first"), huge("second")]);

    let err = Compiler::new(CompileOptions::new("Wide"))
        .compile(&program)
        .unwrap_err();
    let diagnostics = err.diagnostics().unwrap();
    assert_eq!(diagnostics.len(), 2);

    let functions: Vec<&str> = diagnostics
        .iter()
        .map(|e| match e {
            CompilationError::Encoding(EncodingError::OperandTooLarge { function, .. }) => {
                function.as_str()
            }
            other => panic!("unexpected diagnostic {other:?}"),
        })
        .collect();
    assert_eq!(functions, ["first", "second"]);
}
