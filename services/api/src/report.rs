use crate::infra::ProjectState;
use chrono::Utc;
use clap::Args;
use copro_elevator::apportionment::{AdjustedApportionment, Apportionment};
use copro_elevator::canvassing::TargetTag;
use copro_elevator::error::AppError;
use copro_elevator::quotes::QuoteComparison;
use copro_elevator::votes::{MutationOutcome, ScenarioOutcome, ThresholdStatus};
use copro_elevator::{SimulationRequest, TakeOver, TallyReport, UnitId, WeightOverrides};

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Target cost to split, taxes included
    #[arg(long)]
    pub(crate) amount: f64,
    /// Floor step of the coefficient curve (defaults to the stored weights)
    #[arg(long)]
    pub(crate) step: Option<f64>,
    /// Take-over as payer:beneficiary:percent, repeatable
    #[arg(long = "take-over", value_parser = crate::infra::parse_take_over)]
    pub(crate) take_overs: Vec<TakeOver>,
}

#[derive(Args, Debug)]
pub(crate) struct SetVoteArgs {
    /// Unit number
    pub(crate) unit: u32,
    /// favorable, opposed, abstaining, absent or unknown
    pub(crate) vote: String,
    /// certain, probable, possible or unknown
    #[arg(long)]
    pub(crate) confidence: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Print the dashboard snapshot as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_quotes(state: &ProjectState) {
    let comparison = state.project.compare_quotes();
    render_comparison(&comparison, state.project.rules().comparison.horizon_years);
}

pub(crate) fn run_simulation(state: &ProjectState, args: SimulateArgs) -> Result<(), AppError> {
    let request = SimulationRequest {
        amount: args.amount,
        step: args.step,
        overrides: WeightOverrides::new(),
        take_overs: args.take_overs,
    };
    let outcome = state
        .project
        .simulate(&request)
        .map_err(|err| AppError::InvalidInput(err.to_string()))?;

    render_apportionment(&outcome.apportionment);
    for rejected in &outcome.rejected_take_overs {
        println!(
            "Rejected take-over {} -> {} ({}%): {}",
            rejected.take_over.payer,
            rejected.take_over.beneficiary,
            rejected.take_over.percent,
            rejected.reason
        );
    }
    if let Some(adjusted) = &outcome.adjusted {
        render_adjusted(adjusted);
    }
    Ok(())
}

pub(crate) fn run_tally(state: &ProjectState) -> Result<(), AppError> {
    let report = state.votes.tally()?;
    render_tally(&report);
    Ok(())
}

pub(crate) fn run_vote_update(state: &ProjectState, args: SetVoteArgs) -> Result<(), AppError> {
    let unit_id = UnitId(args.unit);
    let outcome = state
        .votes
        .update_vote(unit_id, Some(&args.vote), args.confidence.as_deref())?;

    match outcome {
        MutationOutcome::Applied => {
            println!("Vote recorded for unit {unit_id}");
            Ok(())
        }
        MutationOutcome::UnitNotFound => {
            Err(AppError::NotFound(format!("vote record for unit {unit_id}")))
        }
    }
}

pub(crate) fn run_report(state: &ProjectState, args: ReportArgs) -> Result<(), AppError> {
    let records = state.votes.records()?;
    let snapshot = state.project.snapshot(&records, Utc::now());

    if args.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Snapshot unavailable: {err}"),
        }
        return Ok(());
    }

    let constants = &snapshot.constants;
    println!(
        "Elevator project report ({})",
        snapshot.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "Co-ownership: {:.0} shares | majority {:.0} | bridge {:.0} | building {} holds {:.0}",
        constants.total_shares,
        constants.majority,
        constants.bridge,
        constants.scenario_building,
        constants.scenario_building_shares
    );

    println!();
    render_comparison(&snapshot.comparison, constants.horizon_years);

    if let Some(simulation) = snapshot
        .simulations
        .iter()
        .find(|simulation| simulation.recommended)
        .or_else(|| snapshot.simulations.first())
    {
        println!("\nQuote-parts for {}", simulation.vendor);
        render_apportionment(&simulation.apportionment);
    }

    println!();
    render_tally(&snapshot.tally);

    let plan = &snapshot.canvassing;
    if plan.targets.is_empty() {
        println!("\nCanvassing: every unit is favorable and certain");
    } else {
        println!("\nCanvassing priorities");
        for target in &plan.targets {
            let contact = if target.contact_made { "contacted" } else { "to contact" };
            println!(
                "- [{}] unit {} ({} floor {}) {} | {:.0} shares | {} / {} | {} | {}",
                target.priority,
                target.unit_id,
                target.building,
                target.floor,
                target.owners.join(", "),
                target.general_share,
                target.choice.label(),
                target.confidence.label(),
                target.group,
                contact
            );
        }
    }

    if !plan.other_building_targets.is_empty() {
        println!("\nOther buildings");
        for target in &plan.other_building_targets {
            let tags: Vec<&str> = target.tags.iter().map(|tag| tag_label(*tag)).collect();
            println!(
                "- unit {} ({} floor {}) {} | {:.0} shares{}",
                target.unit_id,
                target.building,
                target.floor,
                target.owners.join(", "),
                target.general_share,
                if tags.is_empty() {
                    String::new()
                } else {
                    format!(" | {}", tags.join(", "))
                }
            );
        }
    }

    Ok(())
}

fn render_comparison(comparison: &QuoteComparison, horizon_years: u32) {
    println!("Quote comparison");
    if comparison.comparables.is_empty() {
        println!("- no comparable quotes");
    }
    for scored in &comparison.comparables {
        let quote = &scored.quote;
        let marker = if comparison.recommended.as_deref() == Some(quote.vendor.as_str()) {
            " [recommended]"
        } else {
            ""
        };
        println!(
            "- {}{}: {} installed | {} over {} years | {}",
            quote.vendor,
            marker,
            money(quote.posttax_cost),
            money(scored.ten_year_cost),
            horizon_years,
            quote.duration.as_deref().unwrap_or("duration not given")
        );
        let scores = scored.scores;
        println!(
            "  price {} | capacity {} | accessibility {} | speed {} | maintenance {} | floors {}",
            scores.price,
            scores.capacity,
            scores.accessibility,
            scores.speed,
            scores.maintenance,
            scores.floors
        );
    }

    if !comparison.reference.is_empty() {
        println!("Reference only");
        for reference in &comparison.reference {
            println!(
                "- {}: {}{}",
                reference.quote.vendor,
                money(reference.quote.pretax_cost.or(reference.quote.posttax_cost)),
                reference
                    .quote
                    .remarks
                    .as_deref()
                    .map(|remarks| format!(" ({remarks})"))
                    .unwrap_or_default()
            );
        }
    }
}

fn render_apportionment(apportionment: &Apportionment) {
    println!(
        "Split of {:.2} (floor step {}, offset {}, total weight {})",
        apportionment.amount, apportionment.step, apportionment.offset, apportionment.total_weight
    );
    for line in &apportionment.lines {
        let origin = if line.weight.is_estimated() {
            format!(" ({})", line.weight.origin.label())
        } else {
            String::new()
        };
        println!(
            "- unit {} floor {} {} | {} | weight {}{} | {:.2}",
            line.unit_id,
            line.floor,
            line.location,
            line.owners.join(", "),
            line.weight.value,
            origin,
            line.quote_part
        );
    }
    println!("Total {:.2}", apportionment.total_quote_parts());
}

fn render_adjusted(adjusted: &AdjustedApportionment) {
    println!("\nAfter take-overs");
    for line in adjusted.lines.iter().filter(|line| line.delta != 0.0) {
        println!(
            "- unit {}: {:.2} {:+.2} = {:.2}",
            line.unit_id, line.base, line.delta, line.adjusted
        );
    }
}

fn render_tally(report: &TallyReport) {
    println!("Vote tally");
    for total in &report.totals {
        println!(
            "- {}: {} units, {:.0} shares",
            total.choice.label(),
            total.count,
            total.shares
        );
    }
    println!("Favorable by confidence");
    for total in &report.favorable_by_confidence {
        println!(
            "- {}: {} units, {:.0} shares",
            total.confidence.label(),
            total.count,
            total.shares
        );
    }

    render_scenario(&report.co_ownership);
    render_scenario(&report.building);
    println!(
        "Projections: optimistic {:.0} | realistic {:.0} | pessimistic {:.0}",
        report.projections.optimistic,
        report.projections.realistic,
        report.projections.pessimistic
    );
}

fn render_scenario(outcome: &ScenarioOutcome) {
    let needed = if outcome.majority_reached {
        String::new()
    } else {
        format!(", {:.0} shares short of the majority", outcome.shares_needed)
    };
    println!(
        "{}: {:.0} favorable of {:.0} (majority {:.0}, bridge {:.0}) -> {}{}",
        outcome.label,
        outcome.favorable,
        outcome.total,
        outcome.majority,
        outcome.bridge,
        status_label(outcome.status),
        needed
    );
}

fn status_label(status: ThresholdStatus) -> &'static str {
    match status {
        ThresholdStatus::Majority => "majority reached",
        ThresholdStatus::Bridge => "bridge reached, second vote possible",
        ThresholdStatus::Insufficient => "insufficient",
    }
}

fn tag_label(tag: TargetTag) -> &'static str {
    match tag {
        TargetTag::Company => "company",
        TargetTag::LargeShare => "large share",
        TargetTag::HighFloor => "high floor",
    }
}

fn money(amount: Option<f64>) -> String {
    amount
        .map(|amount| format!("{amount:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}
