#![cfg(feature = "testing")]

mod fixtures;

use std::time::Duration;

use fixtures::{gated_validator, options, prefilled_order, ORDER};
use label_flow::shipping_label::traits::MockLabelRepository;
use label_flow::shipping_label::{
    FlowStep, LabelCreationSession, OrderId, RepositoryError, SessionError,
};

#[tokio::test]
async fn test_initial_data_is_loaded_once() {
    let mut repository = MockLabelRepository::new();
    repository
        .expect_load_initial_data()
        .withf(|order_id| *order_id == ORDER)
        .times(1)
        .returning(|_| Ok(prefilled_order().with_completed_steps([FlowStep::OriginAddress])));

    let (session, _presentation) = LabelCreationSession::start(
        ORDER,
        &repository,
        gated_validator(),
        options(true, Duration::from_secs(10)),
    )
    .await
    .unwrap();

    let data = session.current_data();
    assert_eq!(data.current_step, FlowStep::ShippingAddress);
    assert_eq!(session.order_id(), ORDER);
    session.abandon().await;
}

#[tokio::test]
async fn test_load_failure_is_reported() {
    let mut repository = MockLabelRepository::new();
    repository
        .expect_load_initial_data()
        .times(1)
        .returning(|order_id| {
            Err(RepositoryError::LoadFailed {
                order_id,
                reason: "backend unavailable".to_string(),
            })
        });

    let result = LabelCreationSession::start(
        OrderId(5),
        &repository,
        gated_validator(),
        options(true, Duration::from_secs(10)),
    )
    .await;

    match result {
        Err(SessionError::Repository(RepositoryError::LoadFailed { order_id, .. })) => {
            assert_eq!(order_id, OrderId(5))
        }
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("session should not start"),
    }
}
