use taskforge::{AgentConfig, AgentController, TaskReport, TaskStatus};

const USAGE: &str = "Usage: taskforge [--debug] <task description>

Runs one task through the agent loop and prints the run report as JSON.

Options:
  --debug    Use the heavier-reasoning model variant
  -h, --help Show this message

Environment:
  GROQ_API_KEY   API credential (required)
  GROQ_BASE_URL  Override the API base URL
  RUST_LOG       Log filter (default: info,taskforge=debug)";

#[tokio::main]
async fn main() {
    taskforge::tracing::init_tracing("taskforge");

    let mut debug_mode = false;
    let mut words = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--debug" => debug_mode = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return;
            }
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }
    let task = words.join(" ");

    let config = AgentConfig {
        debug_mode,
        ..AgentConfig::default()
    };

    let controller = match AgentController::from_env(config) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("taskforge: {}", e);
            std::process::exit(2);
        }
    };

    match controller.run_task(&task).await {
        Ok(report) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("report serializes")
            );
            if report.status != TaskStatus::Completed {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("taskforge: task aborted: {}", e);
            let report = TaskReport::errored(&task, e.to_string());
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("report serializes")
            );
            std::process::exit(1);
        }
    }
}
