use crate::shadow::ShadowValue;
use crate::{FpShadowError, ShadowConfig, ShadowContext};
use fpshadow_ops::{
    Conversion, ConvertEvent, Event, FloatWidth, GuestRounding, LaneBits, LaneMode, LocType,
    Location, MarkEvent, OpEvent, OpSite, Operand, ShadowOp,
};

fn site(address: u64, line: u32) -> OpSite {
    OpSite::new(address).with_source("calc.c", line, Some("compute"))
}

fn double(v: f64) -> LaneBits {
    LaneBits::from_f64s(&[v])
}

fn at(loc: Location, v: f64) -> Operand {
    Operand::at(loc, double(v))
}

fn constant(v: f64) -> Operand {
    Operand::constant(double(v))
}

fn scalar_op(op: ShadowOp, address: u64, args: Vec<Operand>, dest: Location, result: f64) -> Event {
    Event::Op(OpEvent::scalar(
        op,
        site(address, 10 + (address & 0xff) as u32 / 0x10),
        LocType::Double,
        args,
        dest,
        double(result),
    ))
}

fn context() -> ShadowContext {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    ShadowContext::new(ShadowConfig::default()).unwrap()
}

fn shadow_at(ctx: &ShadowContext, loc: Location) -> Option<ShadowValue> {
    ctx.storage()
        .get(loc, LocType::Double)
        .unwrap()
        .and_then(|s| s.lane(0).cloned())
}

/// Adds two constants at `address` and stores the sum in `dest`
fn add_constants(ctx: &mut ShadowContext, address: u64, a: f64, b: f64, dest: Location) {
    ctx.handle(&scalar_op(
        ShadowOp::Add,
        address,
        vec![constant(a), constant(b)],
        dest,
        a + b,
    ))
    .unwrap();
}

/// `(x + 1) - x`, which a double gets wrong for large `x`. Leaves the difference in `t2`.
fn cancel(ctx: &mut ShadowContext, x: f64) {
    let sum = x + 1.0;
    ctx.handle(&scalar_op(
        ShadowOp::Add,
        0x1000,
        vec![at(Location::Temp(0), x), constant(1.0)],
        Location::Temp(1),
        sum,
    ))
    .unwrap();
    ctx.handle(&scalar_op(
        ShadowOp::Sub,
        0x1010,
        vec![at(Location::Temp(1), sum), at(Location::Temp(0), x)],
        Location::Temp(2),
        sum - x,
    ))
    .unwrap();
}

fn report_text(ctx: &ShadowContext) -> String {
    let mut out = Vec::new();
    ctx.write_report_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn bootstrapped_operands_have_no_error() {
    let mut ctx = context();
    ctx.handle(&scalar_op(
        ShadowOp::Add,
        0x1000,
        vec![at(Location::Memory(0x800), 0.1), constant(0.2)],
        Location::Temp(0),
        0.1 + 0.2,
    ))
    .unwrap();
    let id = ctx.sites().lookup(0x1000).unwrap();
    assert_eq!(ctx.sites().get(id).error.max_error, 0.0);
    assert!(ctx.sites().tracked().is_empty());
    let operand = shadow_at(&ctx, Location::Memory(0x800)).unwrap();
    assert_eq!(operand.real().to_f64(), 0.1);
    assert_eq!(report_text(&ctx), "No errors found.\n");
}

#[test]
fn one_ulp_off_is_one_bit() {
    let mut ctx = context();
    let next = f64::from_bits(3.0f64.to_bits() + 1);
    ctx.handle(&scalar_op(
        ShadowOp::Add,
        0x1000,
        vec![constant(1.0), constant(2.0)],
        Location::Temp(0),
        next,
    ))
    .unwrap();
    let id = ctx.sites().lookup(0x1000).unwrap();
    assert_eq!(ctx.sites().get(id).error.max_error, 1.0);
}

#[test]
fn cancellation_is_tracked_once_and_generalized() {
    let mut ctx = context();
    for x in [1e16, 2e16, 4e16] {
        cancel(&mut ctx, x);
        ctx.handle(&Event::EndBlock).unwrap();
    }
    let sub = ctx.sites().lookup(0x1010).unwrap();
    let add = ctx.sites().lookup(0x1000).unwrap();
    assert_eq!(ctx.sites().tracked(), &[sub]);
    assert_eq!(ctx.sites().get(add).error.max_error, 0.0);
    let record = ctx.sites().get(sub);
    assert_eq!(record.error.num_evals, 3);
    assert!(record.error.max_error > 61.0);

    let text = report_text(&ctx);
    assert!(text.starts_with(
        "(FPCore (x) (- (+ x 1) x))\nsubtraction in compute at calc.c:11 (address 1010)\n"
    ));
    assert!(text.contains("Aggregated over 3 instances\n"));
}

#[test]
fn machine_report_is_one_sexp_per_site() {
    let config = ShadowConfig {
        human_readable: false,
        typed_bench: true,
        ..Default::default()
    };
    let mut ctx = ShadowContext::new(config).unwrap();
    cancel(&mut ctx, 1e16);
    let text = report_text(&ctx);
    assert!(text.starts_with(
        "((bench (FPCore () :precision binary64 (- (+ 1e16 1) 1e16))) (plain-name \"subtraction\") (function \"compute\") (filename \"calc.c\") (line-num 11) (instr-addr 1010) (avg-error "
    ));
    assert!(text.ends_with("(num-calls 1))\n"));
}

#[test]
fn sites_inside_worse_expressions_are_subsumed() {
    let mut ctx = context();
    cancel(&mut ctx, 1e16);
    ctx.handle(&scalar_op(
        ShadowOp::Mul,
        0x1020,
        vec![at(Location::Temp(2), 0.0), constant(2.0)],
        Location::Temp(3),
        0.0,
    ))
    .unwrap();
    assert_eq!(ctx.sites().tracked().len(), 2);
    let report = ctx.report();
    assert_eq!(report.sites.len(), 1);
    assert_eq!(report.sites[0].op, ShadowOp::Mul);
    assert_eq!(
        report.sites[0].expr.as_ref().unwrap().expr,
        "(* (- (+ 1e16 1) 1e16) 2)"
    );

    let unsubsumed = ShadowConfig {
        report_exprs: false,
        ..Default::default()
    };
    let mut ctx = ShadowContext::new(unsubsumed).unwrap();
    cancel(&mut ctx, 1e16);
    ctx.handle(&scalar_op(
        ShadowOp::Mul,
        0x1020,
        vec![at(Location::Temp(2), 0.0), constant(2.0)],
        Location::Temp(3),
        0.0,
    ))
    .unwrap();
    let report = ctx.report();
    assert_eq!(report.sites.len(), 2);
    assert!(report.sites.iter().all(|s| s.expr.is_none()));
    assert!(shadow_at(&ctx, Location::Temp(3)).unwrap().stem().is_none());
}

#[test]
fn negated_variables_are_not_reported() {
    let mut ctx = context();
    // Negating two different operations generalizes the negation to `(- x)`
    for (op, address, result) in [(ShadowOp::Sub, 0x1010, 0.0), (ShadowOp::Div, 0x1110, 1.0)] {
        ctx.handle(&scalar_op(
            ShadowOp::Add,
            0x1000,
            vec![at(Location::Temp(0), 1e16), constant(1.0)],
            Location::Temp(1),
            1e16 + 1.0,
        ))
        .unwrap();
        ctx.handle(&scalar_op(
            op,
            address,
            vec![at(Location::Temp(1), 1e16), at(Location::Temp(0), 1e16)],
            Location::Temp(2),
            result,
        ))
        .unwrap();
        ctx.handle(&scalar_op(
            ShadowOp::Neg,
            0x1030,
            vec![at(Location::Temp(2), result)],
            Location::Temp(3),
            -result,
        ))
        .unwrap();
        ctx.handle(&Event::EndBlock).unwrap();
    }
    let neg = ctx.sites().lookup(0x1030).unwrap();
    assert!(ctx.sites().get(neg).is_tracked());
    let report = ctx.report();
    assert_eq!(report.sites.len(), 1);
    assert_eq!(report.sites[0].op, ShadowOp::Sub);
    assert!(!report_text(&ctx).contains("negation"));
}

#[test]
fn values_outlive_every_slot_while_a_stem_holds_them() {
    let mut ctx = context();
    ctx.handle(&scalar_op(
        ShadowOp::Add,
        0x1000,
        vec![at(Location::Temp(0), 1.0), constant(2.0)],
        Location::Temp(1),
        3.0,
    ))
    .unwrap();
    let value = shadow_at(&ctx, Location::Temp(1)).unwrap();
    assert_eq!(value.refcount(), 2);

    let moves = [
        (Location::Temp(1), Location::Register(16)),
        (Location::Register(16), Location::Memory(0x5000)),
    ];
    for (src, dest) in moves {
        ctx.handle(&Event::Move {
            src,
            dest,
            ty: LocType::Double,
        })
        .unwrap();
    }
    assert_eq!(value.refcount(), 4);
    assert!(shadow_at(&ctx, Location::Memory(0x5000)).unwrap().ptr_eq(&value));

    ctx.handle(&scalar_op(
        ShadowOp::Mul,
        0x1010,
        vec![at(Location::Memory(0x5000), 3.0), constant(2.0)],
        Location::Memory(0x6000),
        6.0,
    ))
    .unwrap();
    assert_eq!(value.refcount(), 5);

    ctx.handle(&Event::EndBlock).unwrap();
    ctx.handle(&Event::Unshadow {
        dest: Location::Register(16),
        ty: LocType::Double,
    })
    .unwrap();
    ctx.handle(&Event::Unshadow {
        dest: Location::Memory(0x5000),
        ty: LocType::Double,
    })
    .unwrap();
    assert_eq!(value.refcount(), 2);
    assert_eq!(value.real().to_f64(), 3.0);

    ctx.handle(&Event::Unshadow {
        dest: Location::Memory(0x6000),
        ty: LocType::Double,
    })
    .unwrap();
    assert_eq!(value.refcount(), 1);
}

#[test]
fn lowest_lane_ops_pass_upper_lanes_through() {
    let mut ctx = context();
    let event = OpEvent::scalar(
        ShadowOp::Add,
        site(0x1000, 3),
        LocType::Doublex2,
        vec![
            Operand::at(Location::Temp(0), LaneBits::from_f64s(&[1.0, 5.0])),
            Operand::at(Location::Temp(1), LaneBits::from_f64s(&[2.0, 7.0])),
        ],
        Location::Temp(2),
        LaneBits::from_f64s(&[3.0, 5.0]),
    )
    .with_lanes(LaneMode::Lowest);
    ctx.handle(&Event::Op(event)).unwrap();

    let first = ctx.storage().get(Location::Temp(0), LocType::Doublex2).unwrap().unwrap();
    let out = ctx.storage().get(Location::Temp(2), LocType::Doublex2).unwrap().unwrap();
    assert_eq!(out.lane(0).unwrap().real().to_f64(), 3.0);
    assert!(out.lane(1).unwrap().ptr_eq(first.lane(1).unwrap()));
    let id = ctx.sites().lookup(0x1000).unwrap();
    assert_eq!(ctx.sites().get(id).error.num_evals, 1);
}

#[test]
fn packed_ops_compute_every_lane() {
    let mut ctx = context();
    let event = OpEvent::scalar(
        ShadowOp::Mul,
        site(0x1000, 3),
        LocType::Floatx4,
        vec![
            Operand::constant(LaneBits::from_f32s(&[1.0, 2.0, 3.0, 4.0])),
            Operand::constant(LaneBits::from_f32s(&[0.5, 0.5, 0.5, 0.5])),
        ],
        Location::Temp(0),
        LaneBits::from_f32s(&[0.5, 1.0, 1.5, 2.0]),
    );
    ctx.handle(&Event::Op(event)).unwrap();
    let out = ctx.storage().get(Location::Temp(0), LocType::Floatx4).unwrap().unwrap();
    let reals: Vec<f32> = out.lanes().iter().map(|l| l.as_ref().unwrap().real().to_f32()).collect();
    assert_eq!(reals, vec![0.5, 1.0, 1.5, 2.0]);
    let id = ctx.sites().lookup(0x1000).unwrap();
    assert_eq!(ctx.sites().get(id).error.num_evals, 4);
    assert_eq!(ctx.sites().get(id).error.max_error, 0.0);
}

#[test]
fn unsupported_shapes_leave_the_destination_unshadowed() {
    let mut ctx = context();
    add_constants(&mut ctx, 0x1000, 1.0, 1.0, Location::Temp(0));
    let event = OpEvent::scalar(
        ShadowOp::Sin,
        site(0x1010, 4),
        LocType::Doublex2,
        vec![Operand::constant(LaneBits::from_f64s(&[1.0, 2.0]))],
        Location::Temp(0),
        LaneBits::from_f64s(&[1.0f64.sin(), 2.0f64.sin()]),
    );
    ctx.handle(&Event::Op(event)).unwrap();
    assert!(shadow_at(&ctx, Location::Temp(0)).is_none());
    assert!(ctx.sites().lookup(0x1010).is_none());
}

#[test]
fn malformed_events_are_errors() {
    let mut ctx = context();
    let result = ctx.handle(&scalar_op(
        ShadowOp::Add,
        0x1000,
        vec![constant(1.0)],
        Location::Temp(0),
        1.0,
    ));
    assert!(matches!(result, Err(FpShadowError::Ops(_))));
    let result = ctx.handle(&scalar_op(
        ShadowOp::Sqrt,
        0x1000,
        vec![constant(1.0)],
        Location::Temp(99_999),
        1.0,
    ));
    assert!(matches!(result, Err(FpShadowError::TempOutOfRange { .. })));
}

#[test]
fn stopped_runtime_produces_no_shadows() {
    let mut ctx = context();
    add_constants(&mut ctx, 0x1000, 1.0, 1.0, Location::Temp(0));
    ctx.handle(&Event::Stop).unwrap();
    assert!(!ctx.is_running());
    add_constants(&mut ctx, 0x1010, 1.0, 2.0, Location::Temp(1));
    assert!(shadow_at(&ctx, Location::Temp(1)).is_none());
    assert!(ctx.sites().lookup(0x1010).is_none());
    assert!(shadow_at(&ctx, Location::Temp(0)).is_some());

    ctx.handle(&Event::Start).unwrap();
    add_constants(&mut ctx, 0x1010, 1.0, 2.0, Location::Temp(1));
    assert!(shadow_at(&ctx, Location::Temp(1)).is_some());
}

#[test]
fn conversions_move_shadows_between_lanes() {
    let mut ctx = context();
    add_constants(&mut ctx, 0x1000, 1.0, 2.0, Location::Temp(0));
    add_constants(&mut ctx, 0x1010, 3.0, 4.0, Location::Temp(1));
    let low = shadow_at(&ctx, Location::Temp(0)).unwrap();
    let high = shadow_at(&ctx, Location::Temp(1)).unwrap();
    let convert = |conv, args: Vec<usize>, dest| {
        Event::Convert(ConvertEvent {
            conv,
            args: args.into_iter().map(Location::Temp).collect(),
            dest: Location::Temp(dest),
        })
    };

    ctx.handle(&convert(Conversion::ConcatLanes64, vec![1, 0], 2)).unwrap();
    let packed = ctx.storage().get(Location::Temp(2), LocType::Doublex2).unwrap().unwrap();
    assert!(packed.lane(0).unwrap().ptr_eq(&low));
    assert!(packed.lane(1).unwrap().ptr_eq(&high));

    ctx.handle(&convert(Conversion::HighLane64, vec![2], 3)).unwrap();
    assert!(shadow_at(&ctx, Location::Temp(3)).unwrap().ptr_eq(&high));

    ctx.handle(&convert(Conversion::F64ToF32, vec![3], 4)).unwrap();
    let single = ctx.storage().get(Location::Temp(4), LocType::Float).unwrap().unwrap();
    assert!(single.lane(0).unwrap().ptr_eq(&high));
    assert!(ctx.storage().get(Location::Temp(4), LocType::Double).unwrap().is_none());

    ctx.handle(&convert(Conversion::ZeroHigh64, vec![2], 5)).unwrap();
    let zeroed = ctx.storage().get(Location::Temp(5), LocType::Doublex2).unwrap().unwrap();
    assert!(zeroed.lane(0).unwrap().ptr_eq(&low));
    assert!(zeroed.lane(1).is_none());

    ctx.handle(&convert(Conversion::F32ToF64, vec![9], 6)).unwrap();
    assert!(shadow_at(&ctx, Location::Temp(6)).is_none());

    assert!(matches!(
        ctx.handle(&convert(Conversion::LowLane64, vec![1, 2], 7)),
        Err(FpShadowError::ArityMismatch { expected: 1, found: 2, .. })
    ));
}

#[test]
fn registers_follow_the_running_thread() {
    let mut ctx = context();
    add_constants(&mut ctx, 0x1000, 1.0, 2.0, Location::Register(32));
    ctx.handle(&Event::SwitchThread { tid: 7 }).unwrap();
    assert!(shadow_at(&ctx, Location::Register(32)).is_none());
    ctx.handle(&Event::SwitchThread { tid: 0 }).unwrap();
    assert!(shadow_at(&ctx, Location::Register(32)).is_some());
    ctx.handle(&Event::ExitThread { tid: 0 }).unwrap();
    assert!(shadow_at(&ctx, Location::Register(32)).is_none());
}

#[test]
fn marks_need_a_source_location() {
    let mut ctx = context();
    let mark = Event::Mark(MarkEvent {
        site: OpSite::new(0x2000),
        operand: at(Location::Temp(0), 1.0),
        ty: LocType::Double,
        lane: 0,
    });
    assert!(matches!(ctx.handle(&mark), Err(FpShadowError::UnattributableMark(_))));
}

#[test]
fn marks_report_their_erroneous_influences() {
    let mut ctx = context();
    cancel(&mut ctx, 1e16);
    ctx.handle(&Event::Mark(MarkEvent {
        site: OpSite::new(0x2000).with_source("calc.c", 20, Some("main")),
        operand: at(Location::Temp(2), 0.0),
        ty: LocType::Double,
        lane: 0,
    }))
    .unwrap();
    let sub = ctx.sites().lookup(0x1010).unwrap();
    let mark = ctx.marks().iter().next().unwrap();
    assert_eq!(mark.influences(), &[sub]);
    assert!(mark.error.max_error > 61.0);

    let text = report_text(&ctx);
    assert!(text.contains("Result in main at calc.c:20 (address 2000)\n"));
    assert!(text.contains(
        "Influenced by erroneous expressions:\n\n    (FPCore () (- (+ 1e16 1) 1e16))\n    subtraction in compute at calc.c:11 (address 1010)\n"
    ));
}

fn mark_temp(ctx: &mut ShadowContext, temp: usize, value: f64) {
    ctx.handle(&Event::Mark(MarkEvent {
        site: OpSite::new(0x2000).with_source("calc.c", 20, Some("main")),
        operand: at(Location::Temp(temp), value),
        ty: LocType::Double,
        lane: 0,
    }))
    .unwrap();
}

#[test]
fn marks_keep_influences_without_expressions() {
    let mut ctx = ShadowContext::new(ShadowConfig {
        report_exprs: false,
        ..ShadowConfig::default()
    })
    .unwrap();
    cancel(&mut ctx, 1e16);
    assert!(shadow_at(&ctx, Location::Temp(2)).unwrap().stem().is_none());
    mark_temp(&mut ctx, 2, 0.0);

    let sub = ctx.sites().lookup(0x1010).unwrap();
    let mark = ctx.marks().iter().next().unwrap();
    assert_eq!(mark.influences(), &[sub]);
    let text = report_text(&ctx);
    assert!(text.contains(
        "Influenced by erroneous expressions:\n\n    subtraction in compute at calc.c:11 (address 1010)\n"
    ));
}

#[test]
fn influences_reach_past_any_expression_depth() {
    let mut ctx = context();
    cancel(&mut ctx, 1e16);
    for _ in 0..3 * ctx.config().max_subsume_depth {
        ctx.handle(&scalar_op(
            ShadowOp::Mul,
            0x1100,
            vec![at(Location::Temp(2), 0.0), constant(1.0)],
            Location::Temp(2),
            0.0,
        ))
        .unwrap();
    }
    mark_temp(&mut ctx, 2, 0.0);

    let sub = ctx.sites().lookup(0x1010).unwrap();
    let mul = ctx.sites().lookup(0x1100).unwrap();
    let mark = ctx.marks().iter().next().unwrap();
    assert_eq!(mark.influences(), &[sub, mul]);
}

#[test]
fn rounding_operands_reach_the_shadow() {
    let mut ctx = context();
    let round = |address: u64, rounding: Option<GuestRounding>, result: f64| {
        let event = OpEvent::scalar(
            ShadowOp::RoundToInt,
            site(address, 10),
            LocType::Double,
            vec![constant(2.5)],
            Location::Temp(0),
            double(result),
        );
        Event::Op(match rounding {
            Some(rounding) => event.with_rounding(rounding),
            None => event,
        })
    };

    ctx.handle(&round(0x1000, Some(GuestRounding::PosInf), 3.0)).unwrap();
    assert_eq!(shadow_at(&ctx, Location::Temp(0)).unwrap().real().to_f64(), 3.0);
    ctx.handle(&round(0x1010, Some(GuestRounding::NegInf), 2.0)).unwrap();
    assert_eq!(shadow_at(&ctx, Location::Temp(0)).unwrap().real().to_f64(), 2.0);
    // No operand means round to nearest, ties to even
    ctx.handle(&round(0x1020, None, 2.0)).unwrap();
    assert_eq!(shadow_at(&ctx, Location::Temp(0)).unwrap().real().to_f64(), 2.0);
    for address in [0x1000, 0x1010, 0x1020] {
        let id = ctx.sites().lookup(address).unwrap();
        assert_eq!(ctx.sites().get(id).error.max_error, 0.0);
    }

    // A guest that ignored its rounding operand is caught
    ctx.handle(&round(0x1030, Some(GuestRounding::PosInf), 2.0)).unwrap();
    let wrong = ctx.sites().lookup(0x1030).unwrap();
    assert!(ctx.sites().get(wrong).is_tracked());
}

#[test]
fn single_precision_errors_count_single_ulps() {
    let mut ctx = context();
    let single = |v: f32| Operand::constant(LaneBits::from_f32s(&[v]));
    // 1 + 2^-23 is exact in a float; the guest reports the float one below it
    ctx.handle(&Event::Op(OpEvent::scalar(
        ShadowOp::Add,
        site(0x1000, 10),
        LocType::Float,
        vec![single(1.0), single(f32::EPSILON)],
        Location::Temp(0),
        LaneBits::from_f32s(&[1.0]),
    )))
    .unwrap();

    let id = ctx.sites().lookup(0x1000).unwrap();
    let record = ctx.sites().get(id);
    assert_eq!(record.width, FloatWidth::F32);
    assert_eq!(record.error.max_error, 1.0);
    assert!(!record.is_tracked());
    let shadow = ctx.storage().get(Location::Temp(0), LocType::Float).unwrap().unwrap();
    assert_eq!(shadow.lane(0).unwrap().real().to_f32(), 1.0 + f32::EPSILON);
}

#[test]
fn single_precision_benches_print_single_constants() {
    let mut ctx = ShadowContext::new(ShadowConfig {
        human_readable: false,
        typed_bench: true,
        ..ShadowConfig::default()
    })
    .unwrap();
    let single = |v: f32| LaneBits::from_f32s(&[v]);
    let float_op = |op, address, args, dest, result: f32| {
        Event::Op(OpEvent::scalar(
            op,
            site(address, 12),
            LocType::Float,
            args,
            dest,
            single(result),
        ))
    };
    let x = 1e8f32;
    ctx.handle(&float_op(
        ShadowOp::Add,
        0x1000,
        vec![Operand::at(Location::Temp(0), single(x)), Operand::constant(single(0.1))],
        Location::Temp(1),
        x + 0.1,
    ))
    .unwrap();
    ctx.handle(&float_op(
        ShadowOp::Sub,
        0x1010,
        vec![Operand::at(Location::Temp(1), single(x)), Operand::at(Location::Temp(0), single(x))],
        Location::Temp(2),
        0.0,
    ))
    .unwrap();

    let text = report_text(&ctx);
    assert!(text.starts_with(
        "((bench (FPCore () :precision binary32 (- (+ 100000000 0.1) 100000000))) (plain-name \"subtraction\")"
    ));
}

#[test]
fn reports_are_written_to_disk() {
    let mut ctx = context();
    cancel(&mut ctx, 1e16);
    let path = std::env::temp_dir().join(format!("fpshadow-report-{}.gh", std::process::id()));
    ctx.write_report(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(written, report_text(&ctx));
}
