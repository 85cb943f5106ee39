use colored::*;
use socratic_agent::SessionRecord;
use std::path::Path;

pub fn print_banner() {
    println!("{}", "AI Student Assistant initialized!".bold());
    println!("Starting conversation about the research paper...");
    println!(
        "Type {} to save and exit, {} to start a new session.",
        "'quit'".yellow(),
        "'clear'".yellow()
    );
    println!();
}

pub fn print_student(message: &str) {
    println!("\n{}: {}", "Student".green().bold(), message);
}

pub fn prompt_examiner() {
    print!("\n{}: ", "Teacher".blue().bold());
}

pub fn print_session_saved(record: &SessionRecord, sessions_file: &Path) {
    println!(
        "\nSession saved! Session ID: {}",
        record.session_id.cyan()
    );
    println!("Session file: {}", sessions_file.display());
}
