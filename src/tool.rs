use std::fmt;

use serde::Serialize;

/// One external process call: program plus an explicit argument list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Subcommand, i.e. the first argument.
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            f.write_str(" ")?;
            f.write_str(arg)?;
        }
        Ok(())
    }
}

/// `tool sine -width W -length L -amplitude A -o FILE -signed`
pub fn sine_invocation(
    tool: &str,
    width: u32,
    length: u32,
    amplitude: i64,
    file: &str,
) -> Invocation {
    Invocation::new(tool)
        .arg("sine")
        .arg("-width")
        .arg(width.to_string())
        .arg("-length")
        .arg(length.to_string())
        .arg("-amplitude")
        .arg(amplitude.to_string())
        .arg("-o")
        .arg(file)
        .arg("-signed")
}

/// `tool data f1 .. fN -o OUT -mif -width W`, inputs kept in the given order.
pub fn data_invocation<S: AsRef<str>>(
    tool: &str,
    files: &[S],
    output: &str,
    width: u32,
) -> Invocation {
    Invocation::new(tool)
        .arg("data")
        .args(files.iter().map(|f| f.as_ref().to_string()))
        .arg("-o")
        .arg(output)
        .arg("-mif")
        .arg("-width")
        .arg(width.to_string())
}
