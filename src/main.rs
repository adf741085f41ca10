pub mod assemble;
pub mod cli;
pub mod error;
pub mod extract;
pub mod schema;
pub mod segment;
pub mod translate;

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    std::process::exit(command_line_interface.run());
}
