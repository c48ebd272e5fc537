use anyhow::{bail, Context as _};
use futures::channel::oneshot;
use parley_client_core::{Client, EventChannel};
use parley_shared::{
    events::{
        CallEvent, ChatEvent, EventBody, LifecycleEvent, PresenceEvent, SignalingEvent,
        TypingEvent,
    },
    id::ConversationId,
    req_args::{
        CreateConversationReqArgs, InitiateCallReqArgs, LoginReqArgs, MessageType, PageReqArgs,
        RegisterReqArgs, SendMessageReqArgs,
    },
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::{CallCommand, Command};

fn no_cb() {}

// Skips everything, commands can carry passwords
#[tracing::instrument(skip_all)]
pub async fn execute(command: Command, client: &Client) -> anyhow::Result<()> {
    let rx = match command {
        Command::Login { email, password } => {
            let args = LoginReqArgs::new(email, password.into());
            wait(client.login(args, no_cb)).await?;
            return print_session(client);
        }
        Command::Register {
            email,
            name,
            password,
        } => {
            let args = RegisterReqArgs::new(email, password.into(), name);
            wait(client.register(args, no_cb)).await?;
            return print_session(client);
        }
        Command::Logout => {
            if !client.is_logged_in() {
                warn!("logout requested without a stored session");
            }
            client.logout(no_cb)
        }
        Command::Me => client.current_user(no_cb),
        Command::Conversations => client.conversations(no_cb),
        Command::Messages {
            conversation_id,
            page,
            limit,
        } => client.messages(
            &conversation_id,
            page_args(PageReqArgs::messages_default(), page, limit),
            no_cb,
        ),
        Command::Send {
            conversation_id,
            content,
            message_type,
        } => {
            let args =
                SendMessageReqArgs::text(content).message_type(MessageType::new(message_type));
            client.send_message(&conversation_id, &args, no_cb)
        }
        Command::CreateConversation {
            participants,
            kind,
            name,
        } => {
            let args = CreateConversationReqArgs::new(kind, participants).name(name);
            client.create_conversation(&args, no_cb)
        }
        Command::Call(call) => match call {
            CallCommand::Initiate {
                conversation_id,
                call_type,
            } => client.initiate_call(
                &InitiateCallReqArgs {
                    conversation_id,
                    call_type,
                },
                no_cb,
            ),
            CallCommand::Answer { call_id } => client.answer_call(&call_id, no_cb),
            CallCommand::Decline { call_id } => client.decline_call(&call_id, no_cb),
            CallCommand::End { call_id } => client.end_call(&call_id, no_cb),
            CallCommand::History { page, limit } => client.call_history(
                page_args(PageReqArgs::call_history_default(), page, limit),
                no_cb,
            ),
        },
        Command::Listen { join } => return listen(client, join).await,
    };
    let body = wait(rx).await?;
    print_json(&body)
}

async fn wait(
    rx: oneshot::Receiver<anyhow::Result<serde_json::Value>>,
) -> anyhow::Result<serde_json::Value> {
    rx.await.context("request dropped before it completed")?
}

fn page_args(default: PageReqArgs, page: Option<u32>, limit: Option<u32>) -> PageReqArgs {
    PageReqArgs::new(page.unwrap_or(default.page), limit.unwrap_or(default.limit))
}

/// The token stays in the credentials file, only the user is shown
fn print_session(client: &Client) -> anyhow::Result<()> {
    match client.user_data() {
        Some(user) => print_json(user.as_value()),
        None => bail!("backend did not return a session"),
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to format response")?;
    println!("{text}");
    Ok(())
}

fn print_event(name: &str, body: &EventBody) {
    println!("[{name}] {}", body.as_value());
}

#[tracing::instrument(skip(client))]
async fn listen(client: &Client, join: Option<ConversationId>) -> anyhow::Result<()> {
    if !client.is_logged_in() {
        bail!("not logged in, run `parley login` first");
    }

    let channel = client.event_channel();
    let (lifecycle_tx, mut lifecycle_rx) = mpsc::unbounded_channel();
    channel.on_lifecycle(move |event| {
        // Receiver only goes away once we are shutting down
        let _ = lifecycle_tx.send(event);
    });
    register_printers(&channel);
    channel.connect().await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut joined = false;
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                info!("Ctrl-C received");
                break;
            }
            event = lifecycle_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    LifecycleEvent::Connected => println!("[connect]"),
                    LifecycleEvent::Authenticated(body) => {
                        let user = body.user.as_ref().and_then(|u| u.name()).unwrap_or("unknown");
                        println!("[authenticated] as {user}");
                        if let Some(conversation_id) = &join {
                            channel.join_conversation(conversation_id).await;
                            joined = true;
                            println!("joined conversation {conversation_id}");
                        }
                    }
                    LifecycleEvent::AuthenticationError(body) => {
                        print_event("authentication_error", &body);
                        break;
                    }
                    LifecycleEvent::Disconnected(body) => {
                        print_event("disconnect", &body);
                        break;
                    }
                    LifecycleEvent::ConnectError(body) => {
                        print_event("connect_error", &body);
                        break;
                    }
                }
            }
        }
    }

    if joined && channel.is_connected() {
        if let Some(conversation_id) = &join {
            channel.leave_conversation(conversation_id).await;
        }
    }
    channel.disconnect().await;
    Ok(())
}

fn register_printers(channel: &EventChannel) {
    channel.on_chat(|event| match event {
        ChatEvent::NewMessage(body) => print_event("new_message", &body),
    });
    channel.on_typing(|event| match event {
        TypingEvent::UserTyping(body) => print_event("user_typing", &body),
        TypingEvent::UserStopTyping(body) => print_event("user_stop_typing", &body),
    });
    channel.on_call(|event| match event {
        CallEvent::Incoming(body) => print_event("incoming_call", &body),
        CallEvent::Answered(body) => print_event("call_answered", &body),
        CallEvent::Declined(body) => print_event("call_declined", &body),
        CallEvent::Ended(body) => print_event("call_ended", &body),
    });
    channel.on_signaling(|event| match event {
        SignalingEvent::Offer(body) => print_event("call_offer", &body),
        SignalingEvent::Answer(body) => print_event("call_answer", &body),
        SignalingEvent::IceCandidate(body) => print_event("ice_candidate", &body),
    });
    channel.on_presence(|event| match event {
        PresenceEvent::UserOnline(body) => print_event("user_online", &body),
        PresenceEvent::UserOffline(body) => print_event("user_offline", &body),
    });
}
