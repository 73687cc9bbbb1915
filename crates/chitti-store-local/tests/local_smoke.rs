use chitti_storage::{
    DrawFilter, DrawId, Group, GroupId, GroupStatus, LotteryDraw, Member, Payment, PaymentFilter,
    PaymentId, PeriodId, Store, StoreError, Write, WriteBatch,
};
use chitti_store_local::LocalStore;
use chrono::Utc;

fn group(names: &[&str]) -> Group {
    Group {
        id: GroupId::new(),
        name: "Friends Fund".to_string(),
        monthly_amount: 5000,
        commission_percent: 5,
        members: names.iter().map(|n| Member::new(*n)).collect(),
        status: GroupStatus::Active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        version: 0,
    }
}

fn payment(group: &Group, member: usize, period: &str, amount: i64) -> Payment {
    Payment {
        id: PaymentId::new(),
        group_id: group.id,
        member_id: group.members[member].id,
        member_name: group.members[member].name.clone(),
        amount,
        period: PeriodId::parse(period).unwrap(),
        recorded_at: Utc::now(),
        description: None,
        draw_id: None,
    }
}

#[tokio::test]
async fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("ledger.json");

    let g = group(&["A", "B"]);
    let p1 = payment(&g, 0, "2024-01", 5000);
    let p2 = payment(&g, 1, "2024-01", 5000);
    let draw = LotteryDraw {
        id: DrawId::new(),
        group_id: g.id,
        period: PeriodId::parse("2024-01").unwrap(),
        winner_member_id: g.members[1].id,
        winner_name: "B".to_string(),
        surcharge_amount: 2000,
        surcharge_payment_id: PaymentId::new(),
        drawn_at: Utc::now(),
    };

    {
        let store = LocalStore::open(&path).await.unwrap();
        store
            .commit(
                &WriteBatch::new()
                    .push(Write::InsertGroup(g.clone()))
                    .push(Write::InsertPayment(p1.clone()))
                    .push(Write::InsertPayment(p2.clone()))
                    .push(Write::InsertDraw(draw.clone())),
            )
            .await
            .unwrap();
    }

    let reopened = LocalStore::open(&path).await.unwrap();
    assert_eq!(reopened.path(), Some(path.as_path()));
    assert_eq!(reopened.get_group(&g.id).await.unwrap(), g);
    assert_eq!(reopened.get_payment(&p2.id).await.unwrap(), p2);
    assert_eq!(reopened.get_draw(&draw.id).await.unwrap(), draw);

    let all = reopened
        .list_payments(&PaymentFilter::for_group(g.id))
        .await
        .unwrap();
    assert_eq!(all, vec![p1.clone(), p2.clone()]);
}

#[tokio::test]
async fn filters_and_deletes() {
    let store = LocalStore::in_memory();
    let g = group(&["A", "B"]);
    let jan = payment(&g, 0, "2024-01", 5000);
    let feb = payment(&g, 0, "2024-02", 5000);
    let other = payment(&g, 1, "2024-01", 4000);

    store
        .commit(
            &WriteBatch::new()
                .push(Write::InsertGroup(g.clone()))
                .push(Write::InsertPayment(jan.clone()))
                .push(Write::InsertPayment(feb.clone()))
                .push(Write::InsertPayment(other.clone())),
        )
        .await
        .unwrap();

    let mut filter = PaymentFilter::for_member(g.id, g.members[0].id);
    assert_eq!(store.list_payments(&filter).await.unwrap().len(), 2);

    filter.period = Some(PeriodId::parse("2024-02").unwrap());
    assert_eq!(store.list_payments(&filter).await.unwrap(), vec![feb.clone()]);

    store
        .commit(&WriteBatch::new().push(Write::DeletePayment(feb.id)))
        .await
        .unwrap();
    assert!(store.list_payments(&filter).await.unwrap().is_empty());
    assert!(matches!(
        store.get_payment(&feb.id).await,
        Err(StoreError::NotFound)
    ));

    assert!(store
        .list_draws(&DrawFilter::for_group(g.id))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn failed_commit_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let g = group(&["A"]);

    let store = LocalStore::open(&path).await.unwrap();
    store
        .commit(&WriteBatch::new().push(Write::InsertGroup(g.clone())))
        .await
        .unwrap();

    let err = store
        .commit(
            &WriteBatch::new()
                .push(Write::DeleteGroup(g.id))
                .push(Write::DeleteDraw(DrawId::new())),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));

    let reopened = LocalStore::open(&path).await.unwrap();
    assert_eq!(reopened.list_groups().await.unwrap().len(), 1);
}

#[tokio::test]
async fn corrupt_document_is_a_backend_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = LocalStore::open(&path).await;
    assert!(matches!(result, Err(StoreError::Backend(_))));
}
