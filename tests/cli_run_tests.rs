mod fixtures;

use std::time::Duration;

use fixtures::{fixture_path, options, springfield_corrected};
use label_flow::cli::commands::{RunCommand, RunOutcome};
use label_flow::cli::SuggestionPick;
use label_flow::shipping_label::{FlowStep, LabelFixture};
use label_flow::ShutdownCoordinator;

#[tokio::test]
async fn test_run_completes_with_suggested_address() {
    let outcome = RunCommand::new(fixture_path("order_suggested.toml"))
        .with_json(true)
        .with_options(options(true, Duration::from_secs(10)))
        .execute()
        .await
        .unwrap();

    match outcome {
        RunOutcome::Completed(data) => {
            assert_eq!(data.completed_steps.len(), FlowStep::ALL.len());
            assert_eq!(data.origin_address, Some(springfield_corrected()));
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_keeps_entered_address_when_asked() {
    let fixture = LabelFixture::load(&fixture_path("order_suggested.toml"))
        .await
        .unwrap();

    let outcome = RunCommand::new(fixture_path("order_suggested.toml"))
        .with_json(true)
        .with_choice(SuggestionPick::Entered)
        .with_options(options(false, Duration::from_secs(10)))
        .execute()
        .await
        .unwrap();

    match outcome {
        RunOutcome::Completed(data) => {
            assert_eq!(data.origin_address, fixture.origin_address);
            assert!(!data.is_completed(FlowStep::Packaging));
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_reports_unreachable_validator() {
    let outcome = RunCommand::new(fixture_path("order_unreachable.toml"))
        .with_json(true)
        .execute()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::StepFailed {
            step: FlowStep::ShippingAddress,
            reason: "connection reset".to_string(),
        }
    );
}

#[tokio::test]
async fn test_run_stops_when_address_must_be_typed() {
    let outcome = RunCommand::new(fixture_path("order_no_origin.toml"))
        .with_json(true)
        .execute()
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::NeedsInput(FlowStep::OriginAddress));
}

#[tokio::test]
async fn test_run_honours_shutdown() {
    let shutdown = ShutdownCoordinator::new();
    shutdown.trigger();

    let outcome = RunCommand::new(fixture_path("order_suggested.toml"))
        .with_json(true)
        .with_shutdown(shutdown)
        .execute()
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Interrupted);
}

#[tokio::test]
async fn test_run_fails_on_missing_fixture() {
    let result = RunCommand::new(fixture_path("does_not_exist.toml"))
        .execute()
        .await;
    assert!(result.is_err());
}
