use resource_lifecycle::collaborators::{self, ai_client, chat_bot::ChatBot, config, context_manager, group_manager};
use resource_lifecycle::config::OrchestratorConfig;
use resource_lifecycle::framework::mock::MockInitializer;
use resource_lifecycle::framework::Registration;
use resource_lifecycle::lifecycle::ResourceSystem;
use std::time::Duration;

fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        default_timeout_ms: 50,
        ..Default::default()
    }
}

/// Full startup with every sample collaborator.
#[tokio::test]
async fn test_full_system_startup() {
    let settings = fast_config();
    let system = ResourceSystem::new(&settings);
    collaborators::register_all(&system.manager, &settings);

    let report = system.start().await.expect("startup did not run");
    assert!(report.is_clean(), "unexpected report: {:?}", report);
    assert_eq!(
        report.initialized,
        vec![
            group_manager::NAME,
            config::NAME,
            ai_client::NAME,
            context_manager::NAME,
            collaborators::chat_bot::NAME
        ]
    );
    assert_eq!(report.resources, 5);

    // Startup runs once
    assert!(system.start().await.is_none());

    let bot = system
        .manager
        .get_default::<ChatBot>(collaborators::chat_bot::NAME)
        .await
        .expect("chat bot not ready");
    assert!(bot.config.is_some());
    assert!(bot.context_manager.is_some());

    let reply = bot.handle_message(1, 7, "hello").await.expect("no reply");
    assert_eq!(reply, "[default-chat-model] hello");
    let reply = bot.handle_message(1, 7, "again").await.expect("no reply");
    assert_eq!(reply, "[default-chat-model] hello\nagain");

    let groups = bot.group_manager.clone().expect("group manager missing");
    groups.set_enabled(1, false).await;
    assert!(bot.handle_message(1, 7, "muted").await.is_none());

    system.shutdown().await.expect("shutdown failed");
}

/// A consumer that asks before startup simply waits for the resource.
#[tokio::test]
async fn test_consumer_waits_for_startup() {
    let settings = fast_config();
    let system = ResourceSystem::new(&settings);
    collaborators::register_all(&system.manager, &settings);

    let early = {
        let manager = system.manager.clone();
        tokio::spawn(async move { manager.get::<ai_client::AiClient>(ai_client::NAME, Duration::from_secs(5)).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    system.start().await.expect("startup did not run");
    let client = early.await.unwrap().expect("ai client not delivered");
    assert_eq!(client.model, "default-chat-model");

    system.shutdown().await.unwrap();
}

/// Without `config`, dependents degrade instead of taking the host down.
#[tokio::test]
async fn test_missing_config_degrades() {
    let settings = fast_config();
    let system = ResourceSystem::new(&settings);
    collaborators::register_all(&system.manager, &settings);

    // Replaces the real config registration
    let broken = MockInitializer::new();
    broken.expect_call().return_err("api key missing");
    system
        .manager
        .queue_registration(Registration::new(config::NAME).initializer_from(broken.clone()));

    let report = system.start().await.expect("startup did not run");
    assert_eq!(report.failed, vec![config::NAME, ai_client::NAME]);
    assert!(report.initialized.contains(&context_manager::NAME.to_string()));
    assert!(report.initialized.contains(&collaborators::chat_bot::NAME.to_string()));
    broken.verify();

    let bot = system
        .manager
        .get_default::<ChatBot>(collaborators::chat_bot::NAME)
        .await
        .expect("chat bot not ready");
    assert!(bot.config.is_none());
    assert!(bot.ai_client.is_none());
    assert!(bot.handle_message(1, 7, "hello").await.is_none());

    system.shutdown().await.unwrap();
}
