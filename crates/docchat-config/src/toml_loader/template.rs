//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# docchat configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[provider]
model = "gemini-1.5-flash"
# api_base = "https://generativelanguage.googleapis.com/v1beta"
# upload_base = "https://generativelanguage.googleapis.com/upload/v1beta"
# api_key_env = "GOOGLE_API_KEY"   # or put GOOGLE_API_KEY in secrets.toml
# request_timeout_secs = 120       # 5-600
# activation_poll_ms = 1000
# activation_max_polls = 30

[generation]
# temperature = 0.3        # 0.0-2.0
# top_p = 0.95             # 0.0-1.0
# top_k = 64
# max_output_tokens = 8192 # 1-65536

[chat]
# seed_question = "What is the title of the document(s)?"
# replay_history = true    # resend the transcript with every question
# directive = "..."        # appended to every question

[upload]
# staging_dir = "/tmp"     # defaults to the OS temp dir
# max_files = 10           # 1-100
# max_file_size_mb = 50
# upload_toast_ms = 2000
# delete_toast_ms = 1000
# summary_toast_ms = 2000

[server]
# bind = "127.0.0.1"
# port = 8501
# session_ttl_secs = 1800  # detached sessions are cleaned up after this
# reap_interval_secs = 60
# hello_timeout_secs = 10

[logging]
# level = "docchat=info"
"##
}
