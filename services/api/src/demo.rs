use crate::infra::{
    as_of_or_today, InMemoryCorrectiveActionRepository, InMemoryEmployeeDirectory,
};
use care_portal::error::AppError;
use care_portal::workflows::discipline::{
    CorrectiveAction, CorrectiveActionInput, CorrectiveActionService, DisciplinePolicy,
    DisciplinePreview, EmployeeId, SignatureArtifact, ViolationCatalog, ViolationCategoryId,
    ViolationSelection,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;
use std::sync::Arc;

type DemoService =
    CorrectiveActionService<InMemoryCorrectiveActionRepository, InMemoryEmployeeDirectory>;

const DEMO_SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the evaluation date (YYYY-MM-DD). Defaults to today in UTC.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Schedule a PIP when the escalation scenario lands on a final warning.
    #[arg(long)]
    pub(crate) schedule_pip: bool,
}

pub(crate) fn run_catalog() {
    let catalog = ViolationCatalog::seeded();
    println!("Violation catalog ({} active categories)", catalog.len());
    for (severity, categories) in catalog.list_active_grouped_by_severity() {
        match severity.conventional_points() {
            Some(range) => println!(
                "\n{} ({}-{} pts)",
                severity.label(),
                range.start(),
                range.end()
            ),
            None => println!("\n{} (ends employment)", severity.label()),
        }
        if categories.is_empty() {
            println!("  (none)");
        }
        for category in categories {
            println!(
                "  - {:<24} {:>2} pts  [{}]",
                category.category_name, category.default_points, category.id.0
            );
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        schedule_pip,
    } = args;

    let today = as_of_or_today(today);
    let now = Utc.from_utc_datetime(&today.and_time(NaiveTime::default()));
    let service = demo_service();

    println!("Progressive discipline demo (as of {today})");
    println!(
        "Rolling window {} days | incident narrative >= {} characters",
        service.policy().window_days,
        service.policy().min_incident_chars
    );

    println!("\n1. First offense");
    let record = record_action(&service, "dsp-101", "tardy", today, None, false, now)?;
    render_record(&service, &record, today)?;

    println!("\n2. Escalation to a final warning");
    for days_ago in [40, 25, 10] {
        record_action(
            &service,
            "dsp-102",
            "no-call-no-show",
            today - Duration::days(days_ago),
            None,
            false,
            now,
        )?;
    }
    let preview = service.preview(&selection("dsp-102", "medication-error", None), today)?;
    render_preview(&preview);
    let pip = schedule_pip && preview.pip_offered;
    let record = record_action(&service, "dsp-102", "medication-error", today, None, pip, now)?;
    render_record(&service, &record, today)?;

    println!("\n3. Mitigating circumstances");
    let record = record_action(
        &service,
        "dsp-103",
        "insubordination",
        today,
        Some(3),
        false,
        now,
    )?;
    println!(
        "- Assigned {} pts, adjusted to {} ({})",
        record.points_assigned,
        record.effective_points(),
        record.adjustment_reason.as_deref().unwrap_or("no reason recorded")
    );
    render_record(&service, &record, today)?;

    println!("\n4. Voiding a prior action");
    let history = service.history(&EmployeeId("dsp-102".to_string()))?;
    if let Some(oldest) = history.last() {
        let voided = service.void(
            &oldest.id,
            "Shift swap approved after the fact".to_string(),
            EmployeeId("hm-001".to_string()),
            now,
        )?;
        println!("- Voided {} ({} pts)", voided.id.0, voided.points_assigned);
        let state = service.point_state(&voided.employee_id, today)?;
        println!(
            "  dsp-102 now at {} pts; earlier records keep their recorded levels",
            state.current_points
        );
    }

    println!("\n5. Immediate termination category");
    let preview = service.preview(&selection("dsp-101", "theft", None), today)?;
    render_preview(&preview);

    println!("\n6. Rolling window expiry");
    let expired = record_action(
        &service,
        "dsp-103",
        "no-call-no-show",
        today - Duration::days(service.policy().window_days + 1),
        None,
        false,
        now,
    )?;
    let state = service.point_state(&expired.employee_id, today)?;
    println!(
        "- {} dated {} falls before the window start {}; dsp-103 stays at {} pts",
        expired.id.0, expired.violation_date, state.window_start, state.current_points
    );

    Ok(())
}

fn demo_service() -> DemoService {
    CorrectiveActionService::new(
        Arc::new(InMemoryCorrectiveActionRepository::default()),
        Arc::new(InMemoryEmployeeDirectory::demo_staff()),
        Arc::new(ViolationCatalog::seeded()),
        DisciplinePolicy::default(),
    )
}

fn selection(
    employee: &str,
    category: &str,
    adjusted: Option<i32>,
) -> ViolationSelection {
    ViolationSelection {
        employee_id: EmployeeId(employee.to_string()),
        violation_category_id: ViolationCategoryId(category.to_string()),
        has_mitigating: adjusted.is_some(),
        points_adjusted: adjusted,
    }
}

fn record_action(
    service: &DemoService,
    employee: &str,
    category: &str,
    violation_date: NaiveDate,
    adjusted: Option<i32>,
    pip_scheduled: bool,
    now: DateTime<Utc>,
) -> Result<CorrectiveAction, AppError> {
    let input = CorrectiveActionInput {
        employee_id: EmployeeId(employee.to_string()),
        house_id: None,
        violation_category_id: ViolationCategoryId(category.to_string()),
        violation_date,
        violation_time: None,
        incident_description: format!(
            "Recorded during the demo walkthrough for category {category}; the house manager \
             reviewed the shift log with the staff member."
        ),
        has_mitigating: adjusted.is_some(),
        mitigating_circumstances: adjusted.map(|_| "Family emergency during shift".to_string()),
        points_adjusted: adjusted,
        adjustment_reason: adjusted
            .map(|_| "First occurrence with documented hardship".to_string()),
        corrective_expectations: vec!["Follow the house call-in procedure".to_string()],
        consequences_text: None,
        pip_scheduled,
        pip_date: pip_scheduled.then(|| violation_date + Duration::days(7)),
        supervisor_signature: Some(SignatureArtifact(DEMO_SIGNATURE.to_string())),
    };
    Ok(service.create_corrective_action_at(input, EmployeeId("hm-001".to_string()), now)?)
}

fn render_preview(preview: &DisciplinePreview) {
    println!(
        "- Preview: {} + {} = {} pts -> {}{}",
        preview.current_points,
        preview.effective_points,
        preview.new_total,
        preview.discipline_level.label(),
        if preview.pip_offered {
            " (PIP may be scheduled)"
        } else {
            ""
        }
    );
    for warning in &preview.warnings {
        println!("  ! {}", warning.message());
    }
}

fn render_record(
    service: &DemoService,
    record: &CorrectiveAction,
    today: NaiveDate,
) -> Result<(), AppError> {
    let state = service.point_state(&record.employee_id, today)?;
    println!(
        "- {} for {} -> {} | {} active action(s), {} pts in window",
        record.id.0,
        record.employee_id.0,
        record.discipline_level.label(),
        state.active_actions,
        state.current_points
    );
    match serde_json::to_string_pretty(&record.summary_view()) {
        Ok(json) => println!("  Summary payload:\n{}", json),
        Err(err) => println!("  Summary payload unavailable: {}", err),
    }
    Ok(())
}
