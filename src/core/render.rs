//! Rendering of execution results to an HTML or ANSI terminal surface.
//!
//! The mode is injected at construction and fixed for the whole run. All
//! escaping lives here; captured output arrives raw. The sink is flushed
//! after every rendered step so an operator watching live sees progress.

use std::io::Write;

use console::{Color, Style};

use crate::config::TerminalConfig;
use crate::error::{Error, Result};
use crate::exec::ExecutionResult;

/// Output encoding for the run, chosen once by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// HTML fragment for networked/HTTP contexts.
    Html,
    /// Plain text with ANSI escapes for interactive consoles.
    Ansi,
}

/// Formats step results into the output sink.
pub struct TerminalRenderer<W: Write> {
    mode: RenderMode,
    identity: String,
    theme: TerminalConfig,
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(mode: RenderMode, identity: impl Into<String>, theme: TerminalConfig, out: W) -> Self {
        Self {
            mode,
            identity: identity.into(),
            theme,
            out,
        }
    }

    /// Open the terminal block. HTML gets the wrapper div; ANSI needs nothing.
    pub fn begin(&mut self) -> Result<()> {
        if self.mode == RenderMode::Html {
            writeln!(
                self.out,
                "<div style=\"overflow:auto;padding:0.5em;background-color:#000;color:#0f0;max-width:{}em;max-height:{}em\">",
                self.theme.width, self.theme.height
            )
            .map_err(write_error)?;
        }
        self.flush()
    }

    /// Close the terminal block.
    pub fn finish(&mut self) -> Result<()> {
        if self.mode == RenderMode::Html {
            writeln!(self.out, "</div>").map_err(write_error)?;
        }
        self.flush()
    }

    /// Render one step result and flush so live output streams.
    pub fn render(&mut self, result: &ExecutionResult) -> Result<()> {
        match self.mode {
            RenderMode::Html => self.render_html(result)?,
            RenderMode::Ansi => self.render_ansi(result)?,
        }
        self.flush()
    }

    fn render_html(&mut self, result: &ExecutionResult) -> Result<()> {
        writeln!(
            self.out,
            "<div><span style=\"color:{};font-weight:bold\">{} ~ $ </span><span>{}</span></div>",
            self.theme.prompt_color,
            escape_html(&self.identity),
            escape_html(&result.command_line)
        )
        .map_err(write_error)?;

        let body: Vec<String> = result
            .stdout_lines
            .iter()
            .chain(result.stderr_lines.iter())
            .map(|line| escape_html(line))
            .collect();
        writeln!(
            self.out,
            "<div style=\"padding:1em;color:#fff\">{}</div>",
            body.join("<br>")
        )
        .map_err(write_error)?;

        let (word, color) = self.status_span(result);
        let color = color.to_string();
        writeln!(
            self.out,
            "<div style=\"display:inline-block;border:1px double white;padding:5px;margin-bottom:1em\"><span style=\"color:{};font-weight:bold\">{} (exec time: </span><span>{}</span>)</div>",
            color,
            word,
            format_duration(result.duration_secs)
        )
        .map_err(write_error)?;

        Ok(())
    }

    fn render_ansi(&mut self, result: &ExecutionResult) -> Result<()> {
        let prompt = paint(
            &format!("{} ~ $ ", self.identity),
            &self.theme.prompt_color,
        );
        writeln!(self.out, "{}{}", prompt, result.command_line).map_err(write_error)?;

        for line in result.stdout_lines.iter().chain(result.stderr_lines.iter()) {
            writeln!(self.out, "{}", line).map_err(write_error)?;
        }

        let (word, color) = self.status_span(result);
        writeln!(
            self.out,
            "{} (exec time: {})",
            paint(word, color),
            format_duration(result.duration_secs)
        )
        .map_err(write_error)?;
        writeln!(self.out).map_err(write_error)?;

        Ok(())
    }

    fn status_span(&self, result: &ExecutionResult) -> (&'static str, &str) {
        if result.success() {
            ("SUCCESS", &self.theme.success_color)
        } else {
            ("ERROR", &self.theme.error_color)
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(write_error)
    }

    /// Consume the renderer and hand back its sink.
    pub fn into_sink(self) -> W {
        self.out
    }
}

fn write_error(err: std::io::Error) -> Error {
    Error::internal_io(err.to_string(), Some("write output sink".to_string()))
}

/// Apply bold + foreground color for a known color name; unknown names
/// degrade to unstyled text. Windows consoles get no escapes at all.
fn paint(text: &str, color_name: &str) -> String {
    if cfg!(windows) {
        return text.to_string();
    }

    match ansi_color(color_name) {
        Some(color) => Style::new()
            .bold()
            .fg(color)
            .force_styling(true)
            .apply_to(text)
            .to_string(),
        None => text.to_string(),
    }
}

/// Fixed color-name lookup table. `tomato` is the default prompt color and
/// maps to its nearest ANSI neighbor.
fn ansi_color(name: &str) -> Option<Color> {
    match name {
        "black" => Some(Color::Black),
        "red" | "tomato" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        _ => None,
    }
}

/// Neutralize markup-significant characters for the HTML surface.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Format elapsed seconds as `HH:MM:SS.mmm`.
pub fn format_duration(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;

    format!(
        "{:02}:{:02}:{:02}.{:03}",
        total_secs / 3600,
        (total_secs / 60) % 60,
        total_secs % 60,
        millis
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ProcessStatus;

    fn sample_result(code: i32) -> ExecutionResult {
        ExecutionResult {
            command_line: "php composer.phar install --no-dev".to_string(),
            stdout_lines: vec!["Loading <composer> repositories".to_string()],
            stderr_lines: vec!["Warning: \"cache\" is stale".to_string()],
            duration_secs: 75.5,
            status: ProcessStatus::Exited { code },
        }
    }

    fn render_to_string(mode: RenderMode, result: &ExecutionResult) -> String {
        let mut renderer =
            TerminalRenderer::new(mode, "deploy@web01", TerminalConfig::default(), Vec::new());
        renderer.begin().unwrap();
        renderer.render(result).unwrap();
        renderer.finish().unwrap();
        String::from_utf8(renderer.out).unwrap()
    }

    #[test]
    fn html_escapes_captured_output() {
        let output = render_to_string(RenderMode::Html, &sample_result(0));
        assert!(output.contains("Loading &lt;composer&gt; repositories"));
        assert!(output.contains("Warning: &quot;cache&quot; is stale"));
        assert!(!output.contains("<composer>"));
    }

    #[test]
    fn html_wraps_output_in_terminal_block() {
        let output = render_to_string(RenderMode::Html, &sample_result(0));
        assert!(output.starts_with("<div style=\"overflow:auto"));
        assert!(output.contains("max-width:80em"));
        assert!(output.trim_end().ends_with("</div>"));
    }

    #[test]
    fn html_status_reflects_exit_code() {
        assert!(render_to_string(RenderMode::Html, &sample_result(0)).contains("SUCCESS"));
        assert!(render_to_string(RenderMode::Html, &sample_result(2)).contains("ERROR"));
    }

    #[test]
    fn ansi_interleaves_stdout_then_stderr() {
        let output = render_to_string(RenderMode::Ansi, &sample_result(0));
        let stdout_pos = output.find("Loading <composer>").unwrap();
        let stderr_pos = output.find("Warning:").unwrap();
        assert!(stdout_pos < stderr_pos);
    }

    #[cfg(not(windows))]
    #[test]
    fn ansi_styles_known_colors_and_degrades_unknown() {
        let styled = render_to_string(RenderMode::Ansi, &sample_result(0));
        assert!(styled.contains("\u{1b}["));

        let mut theme = TerminalConfig::default();
        theme.prompt_color = "chartreuse".to_string();
        theme.success_color = "chartreuse".to_string();
        let mut renderer =
            TerminalRenderer::new(RenderMode::Ansi, "deploy@web01", theme, Vec::new());
        renderer.render(&sample_result(0)).unwrap();
        let plain = String::from_utf8(renderer.out).unwrap();
        assert!(!plain.contains("\u{1b}["));
    }

    #[test]
    fn rendering_is_deterministic() {
        let result = sample_result(1);
        let first = render_to_string(RenderMode::Html, &result);
        let second = render_to_string(RenderMode::Html, &result);
        assert_eq!(first, second);

        let first = render_to_string(RenderMode::Ansi, &result);
        let second = render_to_string(RenderMode::Ansi, &result);
        assert_eq!(first, second);
    }

    #[test]
    fn duration_formats_as_clock_with_millis() {
        assert_eq!(format_duration(0.0), "00:00:00.000");
        assert_eq!(format_duration(0.5), "00:00:00.500");
        assert_eq!(format_duration(75.5), "00:01:15.500");
        assert_eq!(format_duration(3661.25), "01:01:01.250");
    }
}
