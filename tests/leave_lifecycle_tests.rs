//! 请假生命周期引擎测试
//!
//! 覆盖状态机、校验与并发流转语义（基于内存存储）

use uuid::Uuid;

use hrm_system::error::AppError;
use hrm_system::models::leave::{CreateLeaveRequest, LeaveStatus, LeaveType};

mod common;
use common::{admin_ctx, date, employee_ctx, valid_create_request};

#[tokio::test]
async fn test_submit_creates_pending_request() {
    let harness = common::build_harness();
    let employee_id = Uuid::new_v4();

    let created = harness
        .leave_service
        .submit(employee_id, valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    assert_eq!(created.status, LeaveStatus::Pending);
    assert_eq!(created.employee_id, employee_id);
    assert!(created.end_date >= created.start_date);
    assert!(created.approver_id.is_none());
}

#[tokio::test]
async fn test_submit_zero_length_range_is_valid() {
    let harness = common::build_harness();

    let created = harness
        .leave_service
        .submit(Uuid::new_v4(), valid_create_request(date(2026, 8, 10), date(2026, 8, 10)))
        .await
        .unwrap();

    assert_eq!(created.status, LeaveStatus::Pending);
}

#[tokio::test]
async fn test_submit_rejects_short_reason() {
    let harness = common::build_harness();

    let request = CreateLeaveRequest {
        leave_type: LeaveType::Sick,
        start_date: date(2026, 8, 10),
        end_date: date(2026, 8, 11),
        reason: "too short".to_string(),
    };

    let result = harness.leave_service.submit(Uuid::new_v4(), request).await;

    match result {
        Err(AppError::Validation(fields)) => {
            assert!(fields.iter().any(|f| f.field == "reason"));
        }
        other => panic!("expected validation error, got {:?}", other.map(|r| r.status)),
    }
}

#[tokio::test]
async fn test_submit_rejects_inverted_dates() {
    let harness = common::build_harness();

    let result = harness
        .leave_service
        .submit(Uuid::new_v4(), valid_create_request(date(2026, 8, 12), date(2026, 8, 10)))
        .await;

    match result {
        Err(AppError::Validation(fields)) => {
            assert!(fields.iter().any(|f| f.field == "endDate"));
        }
        other => panic!("expected validation error, got {:?}", other.map(|r| r.status)),
    }
}

#[tokio::test]
async fn test_submit_collects_all_violations() {
    let harness = common::build_harness();

    let request = CreateLeaveRequest {
        leave_type: LeaveType::Casual,
        start_date: date(2026, 8, 12),
        end_date: date(2026, 8, 10),
        reason: "short".to_string(),
    };

    let result = harness.leave_service.submit(Uuid::new_v4(), request).await;

    match result {
        Err(AppError::Validation(fields)) => {
            assert!(fields.iter().any(|f| f.field == "reason"));
            assert!(fields.iter().any(|f| f.field == "endDate"));
        }
        other => panic!("expected validation error, got {:?}", other.map(|r| r.status)),
    }
}

#[tokio::test]
async fn test_admin_approves_pending_request() {
    let harness = common::build_harness();
    let admin = admin_ctx();

    let created = harness
        .leave_service
        .submit(Uuid::new_v4(), valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    let approved = harness
        .leave_service
        .approve(created.id, &admin, None)
        .await
        .unwrap();

    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(approved.approver_id, Some(admin.employee_id));
    assert!(approved.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_employee_cannot_approve() {
    let harness = common::build_harness();
    let owner = Uuid::new_v4();

    let created = harness
        .leave_service
        .submit(owner, valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    // 连属主自己都不能批准自己的单
    let result = harness
        .leave_service
        .approve(created.id, &employee_ctx(owner), None)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));

    // 记录保持不变
    let unchanged = harness.leave_service.get(created.id).await.unwrap();
    assert_eq!(unchanged.status, LeaveStatus::Pending);
}

#[tokio::test]
async fn test_reject_stores_decision_note() {
    let harness = common::build_harness();
    let admin = admin_ctx();

    let created = harness
        .leave_service
        .submit(Uuid::new_v4(), valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    let rejected = harness
        .leave_service
        .reject(created.id, &admin, Some("headcount too low that week".to_string()))
        .await
        .unwrap();

    assert_eq!(rejected.status, LeaveStatus::Rejected);
    assert_eq!(rejected.approver_id, Some(admin.employee_id));
    assert_eq!(rejected.decision_note.as_deref(), Some("headcount too low that week"));
}

#[tokio::test]
async fn test_second_decision_is_invalid_state_and_changes_nothing() {
    let harness = common::build_harness();
    let admin = admin_ctx();

    let created = harness
        .leave_service
        .submit(Uuid::new_v4(), valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    let approved = harness
        .leave_service
        .approve(created.id, &admin, None)
        .await
        .unwrap();

    // 二次批准与改判都必须失败，且不改动记录
    let again = harness.leave_service.approve(created.id, &admin, None).await;
    assert!(matches!(again, Err(AppError::InvalidState(_))));

    let flipped = harness.leave_service.reject(created.id, &admin, None).await;
    assert!(matches!(flipped, Err(AppError::InvalidState(_))));

    let current = harness.leave_service.get(created.id).await.unwrap();
    assert_eq!(current.status, LeaveStatus::Approved);
    assert_eq!(current.approver_id, approved.approver_id);
}

#[tokio::test]
async fn test_transition_unknown_id_is_not_found() {
    let harness = common::build_harness();
    let admin = admin_ctx();

    let result = harness.leave_service.approve(Uuid::new_v4(), &admin, None).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_owner_cancels_own_pending_request() {
    let harness = common::build_harness();
    let owner = Uuid::new_v4();

    let created = harness
        .leave_service
        .submit(owner, valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    let cancelled = harness
        .leave_service
        .cancel(created.id, &employee_ctx(owner))
        .await
        .unwrap();

    assert_eq!(cancelled.status, LeaveStatus::Cancelled);
    assert!(cancelled.approver_id.is_none());
}

#[tokio::test]
async fn test_non_owner_employee_cannot_cancel() {
    let harness = common::build_harness();

    let created = harness
        .leave_service
        .submit(Uuid::new_v4(), valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    let result = harness
        .leave_service
        .cancel(created.id, &employee_ctx(Uuid::new_v4()))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_admin_cancels_any_pending_request() {
    let harness = common::build_harness();

    let created = harness
        .leave_service
        .submit(Uuid::new_v4(), valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    let cancelled = harness
        .leave_service
        .cancel(created.id, &admin_ctx())
        .await
        .unwrap();

    assert_eq!(cancelled.status, LeaveStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_approved_request_is_invalid_state() {
    let harness = common::build_harness();
    let owner = Uuid::new_v4();

    let created = harness
        .leave_service
        .submit(owner, valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    harness
        .leave_service
        .approve(created.id, &admin_ctx(), None)
        .await
        .unwrap();

    // 已批准的单走补偿流程，不能在这里取消
    let result = harness
        .leave_service
        .cancel(created.id, &employee_ctx(owner))
        .await;

    assert!(matches!(result, Err(AppError::InvalidState(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approve_and_reject_exactly_one_wins() {
    let harness = common::build_harness();

    let created = harness
        .leave_service
        .submit(Uuid::new_v4(), valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();

    let service_a = harness.leave_service.clone();
    let service_b = harness.leave_service.clone();
    let id = created.id;
    let approver = admin_ctx();
    let rejecter = admin_ctx();

    let approve = tokio::spawn(async move { service_a.approve(id, &approver, None).await });
    let reject = tokio::spawn(async move { service_b.reject(id, &rejecter, None).await });

    let approve_result = approve.await.unwrap();
    let reject_result = reject.await.unwrap();

    // 恰有一个成功；输家看到 InvalidState 而不是静默覆盖
    let successes = [approve_result.is_ok(), reject_result.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(successes, 1);

    let loser = if approve_result.is_ok() {
        reject_result
    } else {
        approve_result
    };
    assert!(matches!(loser, Err(AppError::InvalidState(_))));

    let current = harness.leave_service.get(id).await.unwrap();
    assert!(matches!(current.status, LeaveStatus::Approved | LeaveStatus::Rejected));
}

#[tokio::test]
async fn test_list_projections() {
    let harness = common::build_harness();
    let employee_a = Uuid::new_v4();
    let employee_b = Uuid::new_v4();

    let first = harness
        .leave_service
        .submit(employee_a, valid_create_request(date(2026, 8, 10), date(2026, 8, 12)))
        .await
        .unwrap();
    harness
        .leave_service
        .submit(employee_b, valid_create_request(date(2026, 9, 1), date(2026, 9, 2)))
        .await
        .unwrap();

    harness
        .leave_service
        .approve(first.id, &admin_ctx(), None)
        .await
        .unwrap();

    assert_eq!(harness.leave_service.list_for_employee(employee_a).await.unwrap().len(), 1);
    assert_eq!(harness.leave_service.list_pending().await.unwrap().len(), 1);
    assert_eq!(harness.leave_service.list_all().await.unwrap().len(), 2);

    // 区间相交过滤
    let in_august = harness
        .leave_service
        .list_in_range(date(2026, 8, 1), date(2026, 8, 31))
        .await
        .unwrap();
    assert_eq!(in_august.len(), 1);
    assert_eq!(in_august[0].employee_id, employee_a);
}
