use std::sync::Arc;

use rsvp_fanout::{
    fanout::{BroadcastDispatcher, ConnectionRegistry, DomainEvent, GroupId},
    store::UserSummary,
};

mod utils;

use utils::*;

fn admin() -> UserSummary {
    UserSummary {
        id: "u1".to_string(),
        name: "admin".to_string(),
        email: "admin@gmail.com".to_string(),
    }
}

fn user_joined(event_id: &str, attendee_count: usize) -> DomainEvent {
    DomainEvent::UserJoinedEvent {
        event_id: GroupId::from(event_id),
        user: admin(),
        attendee_count,
    }
}

#[tokio::test]
async fn test_user_joined_reaches_room_members_and_everyone() {
    let mut setup = TestSetupBuilder::new().with_clients(3).build().await;
    let registry = setup.state.registry.clone();
    setup.clients[0].join(&registry, "E1");
    setup.clients[1].join(&registry, "E1");

    setup.state.dispatcher.dispatch(&user_joined("E1", 3));

    for member in &mut setup.clients[..2] {
        let frames = member.drain();
        assert_eq!(frames.len(), 2);
        let room = frames
            .iter()
            .find(|f| f.message_type == "userJoinedEvent")
            .expect("room member should get userJoinedEvent");
        assert_eq!(room.payload["eventId"], "E1");
        assert_eq!(room.payload["attendeeCount"], 3);
        assert!(frames.iter().any(|f| f.message_type == "event:E1:userJoined"));
    }

    assert_eq!(setup.clients[2].drain_types(), vec!["event:E1:userJoined"]);
}

#[tokio::test]
async fn test_event_updated_reaches_every_connection_once() {
    let mut setup = TestSetupBuilder::new().with_clients(3).build().await;
    let event = setup.events[0].clone();

    setup.state.dispatcher.dispatch(&DomainEvent::EventUpdated {
        event: event.clone(),
    });

    for client in &mut setup.clients {
        let frames = client.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_type, "eventUpdated");
        assert_eq!(frames[0].payload["id"], event.id.as_str());
        assert_eq!(frames[0].payload["name"], event.name.as_str());
    }
}

#[tokio::test]
async fn test_disconnected_client_receives_nothing_and_leaves_no_membership() {
    let mut setup = TestSetupBuilder::new().with_clients(2).build().await;
    let registry = setup.state.registry.clone();
    setup.clients[0].join(&registry, "E1");
    setup.clients[0].disconnect(&registry);

    setup.state.dispatcher.dispatch(&DomainEvent::EventUpdated {
        event: setup.events[0].clone(),
    });

    assert!(setup.clients[0].drain().is_empty());
    assert_eq!(setup.clients[1].drain_types(), vec!["eventUpdated"]);
    assert!(!registry
        .members_of(&GroupId::from("E1"))
        .contains(&setup.clients[0].handle.id()));
}

#[tokio::test]
async fn test_leave_stops_room_delivery_only() {
    let mut setup = TestSetupBuilder::new().with_clients(1).build().await;
    let registry = setup.state.registry.clone();
    setup.clients[0].join(&registry, "E1");
    setup.clients[0].leave(&registry, "E1");

    setup.state.dispatcher.dispatch(&user_joined("E1", 1));

    assert_eq!(setup.clients[0].drain_types(), vec!["event:E1:userJoined"]);
}

#[tokio::test]
async fn test_rooms_are_scoped_per_event() {
    let mut setup = TestSetupBuilder::new().with_clients(2).build().await;
    let registry = setup.state.registry.clone();
    setup.clients[0].join(&registry, "E1");
    setup.clients[1].join(&registry, "E2");

    setup.state.dispatcher.dispatch(&user_joined("E2", 4));

    assert_eq!(setup.clients[0].drain_types(), vec!["event:E2:userJoined"]);
    assert_eq!(
        setup.clients[1].drain_types(),
        vec!["event:E2:userJoined", "userJoinedEvent"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unregister_racing_dispatch_is_all_or_nothing() {
    for _ in 0..200 {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Arc::new(BroadcastDispatcher::new(registry.clone()));
        let mut racer = TestClient::connect(&registry);
        racer.join(&registry, "E1");

        let unregister = {
            let registry = registry.clone();
            let handle = racer.handle.clone();
            tokio::spawn(async move { registry.unregister(&handle) })
        };
        let dispatch = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.dispatch(&user_joined("E1", 1)) })
        };

        assert!(unregister.await.unwrap());
        let report = dispatch.await.expect("dispatch must not panic");

        // One snapshot per dispatch: the racer is seen in both subsets or in neither
        let received = racer.drain_types();
        assert!(
            received.is_empty()
                || received == vec!["event:E1:userJoined", "userJoinedEvent"],
            "partial delivery: {:?}",
            received
        );
        assert_eq!(report.failed(), 0);
        assert!(registry.members_of(&GroupId::from("E1")).is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_churn_leaves_registry_consistent() {
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = Arc::new(BroadcastDispatcher::new(registry.clone()));
    let stayer = TestClient::connect(&registry);
    stayer.join(&registry, "E1");

    let mut tasks = Vec::new();
    for i in 0..32 {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            let client = TestClient::connect(&registry);
            let room = if i % 2 == 0 { "E1" } else { "E2" };
            client.join(&registry, room);
            client.join(&registry, room);
            tokio::task::yield_now().await;
            client.disconnect(&registry);
            client.disconnect(&registry);
        }));

        let dispatcher = dispatcher.clone();
        tasks.push(tokio::spawn(async move {
            dispatcher.dispatch(&user_joined("E1", i));
        }));
    }

    for task in tasks {
        task.await.expect("no task may panic");
    }

    assert_eq!(registry.connection_count(), 1);
    assert_eq!(registry.group_count(), 1);
    assert_eq!(
        registry.members_of(&GroupId::from("E1")).into_iter().collect::<Vec<_>>(),
        vec![stayer.handle.id()]
    );
}
