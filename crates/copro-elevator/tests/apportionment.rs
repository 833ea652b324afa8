use copro_elevator::apportionment::WeightOrigin;
use copro_elevator::{
    Apportioner, ApportionmentRules, BuildingCode, ReferenceImporter, TakeOver, TakeOverPlan,
    TakeOverRejection, Unit, UnitId, UnitRegistry, WeightOverrides,
};

const UNITS_CSV: &str = include_str!("../data/units.csv");

fn sample_registry() -> UnitRegistry {
    ReferenceImporter::units_from_reader(UNITS_CSV.as_bytes()).expect("sample units load")
}

fn unit(id: u32, floor: u8, weight: f64) -> Unit {
    Unit {
        id: UnitId(id),
        building: BuildingCode::new("A"),
        floor,
        location: String::new(),
        general_share: 100.0,
        elevator_coefficient: if floor == 0 { 0.0 } else { 1.0 },
        elevator_share: Some(weight),
        owners: Vec::new(),
        board_member: false,
    }
}

#[test]
fn quote_parts_add_up_to_the_target_cost() {
    let registry = sample_registry();
    let apportioner = Apportioner::new(ApportionmentRules::default());

    let mut amounts = vec![1.0, 999.99, 156_170.0, 181_123.0, 1_250_000.0];
    amounts.extend((0..500).map(|index| 150_000.0 + f64::from(index) * 9.97));

    for amount in amounts {
        for step in [0.25, 0.5, 0.75, 1.0] {
            let result =
                apportioner.apportion_with_step(&registry, amount, step, &WeightOverrides::new());
            assert!(
                (result.total_quote_parts() - amount).abs() < 0.005,
                "amount {amount} step {step}: got {}",
                result.total_quote_parts()
            );
            for line in &result.lines {
                assert_eq!(line.quote_part, (line.quote_part * 100.0).round() / 100.0);
            }
        }
    }
}

#[test]
fn zero_coefficient_units_never_pay() {
    let registry = sample_registry();
    let apportioner = Apportioner::new(ApportionmentRules::default());
    let overrides = WeightOverrides::from([(UnitId(1), 500.0)]);

    for step in [0.0, 0.5, 2.0] {
        let result = apportioner.apportion_with_step(&registry, 181_123.0, step, &overrides);
        for line in result.lines.iter().filter(|line| line.floor == 0) {
            assert_eq!(line.quote_part, 0.0, "unit {}", line.unit_id);
        }
    }
}

#[test]
fn estimated_unit_is_flagged_in_the_sample_data() {
    let registry = sample_registry();
    let result = Apportioner::new(ApportionmentRules::default()).apportion(
        &registry,
        181_123.0,
        &WeightOverrides::new(),
    );

    assert_eq!(result.lines.len(), 15);
    let estimated = result.line(UnitId(12)).expect("unit 12 in building A");
    assert_eq!(estimated.weight.origin, WeightOrigin::Estimated);
    assert_eq!(estimated.weight.value, 225.0);
    assert_eq!(result.total_weight, 2077.5);
    assert!(result.line(UnitId(16)).is_none());
}

#[test]
fn two_unit_example_splits_by_weight() {
    let units = [unit(1, 3, 10.0), unit(2, 0, 0.0), unit(3, 4, 180.0)];
    let scope: Vec<&Unit> = units.iter().collect();
    let result = Apportioner::new(ApportionmentRules::default()).apportion_units(
        &scope,
        181_123.0,
        0.5,
        &WeightOverrides::new(),
    );

    assert_eq!(result.total_weight, 190.0);
    assert_eq!(result.line(UnitId(1)).map(|line| line.quote_part), Some(9_532.79));
    assert_eq!(result.line(UnitId(2)).map(|line| line.quote_part), Some(0.0));
    assert!((result.total_quote_parts() - 181_123.0).abs() < 0.005);
}

#[test]
fn take_overs_are_zero_sum() {
    let registry = sample_registry();
    let result = Apportioner::new(ApportionmentRules::default()).apportion(
        &registry,
        156_170.0,
        &WeightOverrides::new(),
    );

    let mut plan = TakeOverPlan::new();
    for (payer, beneficiary, percent) in [(14, 3, 40), (11, 3, 60), (15, 4, 25), (1, 6, 100)] {
        plan.add(TakeOver {
            payer: UnitId(payer),
            beneficiary: UnitId(beneficiary),
            percent,
        })
        .expect("valid take-over");
    }

    let adjusted = result.apply_take_overs(&plan).expect("units in scope");
    assert!(adjusted.net_delta().abs() < 1e-6);
    assert_eq!(adjusted.line(UnitId(3)).map(|line| line.adjusted), Some(0.0));
    assert_eq!(adjusted.line(UnitId(6)).map(|line| line.adjusted), Some(0.0));

    let base_total = result.total_quote_parts();
    let adjusted_total: f64 = adjusted.lines.iter().map(|line| line.adjusted).sum();
    assert!((base_total - adjusted_total).abs() < 0.01);
}

#[test]
fn over_allocation_leaves_the_adjusted_split_unchanged() {
    let registry = sample_registry();
    let result = Apportioner::new(ApportionmentRules::default()).apportion(
        &registry,
        156_170.0,
        &WeightOverrides::new(),
    );

    let mut plan = TakeOverPlan::new();
    plan.add(TakeOver {
        payer: UnitId(14),
        beneficiary: UnitId(7),
        percent: 70,
    })
    .expect("valid take-over");
    let before = result.apply_take_overs(&plan).expect("units in scope");

    let rejected = plan.add(TakeOver {
        payer: UnitId(11),
        beneficiary: UnitId(7),
        percent: 31,
    });
    assert!(matches!(
        rejected,
        Err(TakeOverRejection::OverAllocated { total: 101, .. })
    ));

    let after = result.apply_take_overs(&plan).expect("units in scope");
    assert_eq!(before, after);
}
