//! Help text lookup and rendering.

use super::Interpreter;

const NATIVE_COMMANDS: &[&str] = &[
    "command", "debug", "done", "echo", "error", "help", "local", "onfail", "print", "quit", "v",
    "verbose", "version", "warn",
];

impl Interpreter {
    /// Print the description of `name`, or the command overview when no name
    /// is given. Output goes to the diagnostic stream.
    ///
    /// An unknown name is not an error: a fixed "no help available" notice is
    /// printed instead, so the failure-adapter's lookup path never raises on
    /// the name itself.
    pub fn print_help(&self, name: Option<&str>) {
        match name {
            Some(name) => self.print_command_help(name),
            None => self.print_overview(),
        }
    }

    fn print_command_help(&self, raw: &str) {
        let name = raw.trim_start_matches('-').to_ascii_lowercase();
        if let Some(text) = self.docs.get(&name) {
            self.output
                .emit(&format!("[rill] Command '{name}':\n\n    {text}\n"));
        } else if let Some(definition) = self.lookup(&name) {
            let arity = if definition.has_arguments {
                "takes arguments"
            } else {
                "takes no arguments"
            };
            self.output.emit(&format!(
                "[rill] Command '{}': custom command, {arity}.\n",
                definition.name
            ));
        } else {
            self.output
                .emit(&format!("[rill] No help available for command '{name}'.\n"));
        }
    }

    fn print_overview(&self) {
        let mut text = format!("[rill] rill {}\n\n", env!("CARGO_PKG_VERSION"));
        text.push_str("  Native commands:\n    ");
        text.push_str(&NATIVE_COMMANDS.join(", "));
        text.push('\n');
        let registered = self.command_names();
        if !registered.is_empty() {
            text.push_str("\n  Registered commands:\n    ");
            text.push_str(&registered.join(", "));
            text.push('\n');
        }
        self.output.emit(&text);
    }
}
