use clap::{Parser, Subcommand};
use parley_shared::{
    id::{CallId, ConversationId, UserId},
    req_args::CallType,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(
        short = 's',
        long = "stdout",
        action,
        help = "Controls if it logs to stdout/stderr instead of to a file"
    )]
    pub is_to_std_out: bool,

    #[arg(
        short = 'c',
        long = "config",
        help = "Settings file to use instead of the optional parley.toml"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and store the session
    Register {
        email: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        password: String,
    },
    /// End the session on the backend and forget it locally
    Logout,
    /// Show the signed in user
    Me,
    /// List conversations
    Conversations,
    /// List messages of a conversation
    Messages {
        conversation_id: ConversationId,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Send a message to a conversation
    Send {
        conversation_id: ConversationId,
        content: String,
        #[arg(long = "type", default_value = "text")]
        message_type: String,
    },
    /// Start a new conversation
    CreateConversation {
        #[arg(required = true)]
        participants: Vec<UserId>,
        #[arg(long = "type", default_value = "direct")]
        kind: String,
        #[arg(long)]
        name: Option<String>,
    },
    #[command(subcommand)]
    Call(CallCommand),
    /// Connect to the event channel and print events until Ctrl-C
    Listen {
        #[arg(long)]
        join: Option<ConversationId>,
    },
}

#[derive(Debug, Subcommand)]
pub enum CallCommand {
    Initiate {
        conversation_id: ConversationId,
        #[arg(long = "type", default_value = "voice")]
        call_type: CallType,
    },
    Answer {
        call_id: CallId,
    },
    Decline {
        call_id: CallId,
    },
    End {
        call_id: CallId,
    },
    History {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
}
