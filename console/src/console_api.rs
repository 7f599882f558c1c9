// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConfigKey, ConsoleAction, ConsoleColor, ConsoleError, ConsoleFlags,
            ConsoleLiveness, ConsoleResult, ConsoleSettings, ConsoleState, ConsoleStdin,
            ConsoleStreams, ConsoleWriter, CursorPlacement, EchoDevices, EditContext,
            FontSpec, InputEditor, InputQueue, KeyCommand, KeyOutcome, KeyPress,
            NextInput, OutputComparison, OutputSink, OutputStream, ScriptPair, StdMutex,
            SurfaceOp, SurfaceOpReceiver, SurfaceOpSender, TextRole, TextStyle,
            decode_key, default_script_dirs, discover_script_pair,
            early_return_if_shutdown, lock_recover, ok, read_expected_output,
            read_script_lines, surface_op_channel};
use std::{ops::Range,
          path::{Path, PathBuf},
          sync::{Arc, MutexGuard},
          thread::JoinHandle,
          time::Duration};

pub const CLEAR_MARKER: &str = "==================== (console cleared) ====================";
pub const COMPLETED_TITLE_SUFFIX: &str = " [completed]";
pub const COMPARE_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// What [`ConsoleEngine::read_line()`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLineEvent {
    /// A line, without its newline.
    Line(String),
    /// The user signalled end of input (Ctrl+D on an empty line). This is sticky.
    Eof,
    /// The console shut down.
    Shutdown,
}

impl ReadLineEvent {
    /// The line, or `""` for [`ReadLineEvent::Eof`] and [`ReadLineEvent::Shutdown`].
    #[must_use]
    pub fn into_line(self) -> String {
        match self {
            ReadLineEvent::Line(line) => line,
            ReadLineEvent::Eof | ReadLineEvent::Shutdown => String::new(),
        }
    }
}

/// How to build a [`ConsoleEngine`].
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct ConsoleOptions {
    pub settings: ConsoleSettings,
    pub echo_devices: EchoDevices,
    /// Searched in order by [`ConsoleEngine::load_script_number()`].
    pub script_dirs: Vec<PathBuf>,
    /// How long to wait after loading a numbered script before its expected output is
    /// compared.
    pub compare_settle_delay: Duration,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            settings: ConsoleSettings::default(),
            echo_devices: EchoDevices::default(),
            script_dirs: default_script_dirs(),
            compare_settle_delay: COMPARE_SETTLE_DELAY,
        }
    }
}

#[derive(Debug)]
struct EngineInner {
    flags: ConsoleFlags,
    /// Pending input lock. Acquired before the input queue lock and the output lock
    /// when more than one is needed.
    editor: StdMutex<InputEditor>,
    input: InputQueue,
    output: OutputSink,
    /// Leaf lock, never held while acquiring another one.
    settings: StdMutex<ConsoleSettings>,
    last_save_path: StdMutex<Option<PathBuf>>,
    ops: SurfaceOpSender,
    script_dirs: Vec<PathBuf>,
    compare_settle_delay: Duration,
}

/// A blocking, line oriented console on top of an event driven text surface. See the
/// crate docs for the big picture.
///
/// It is cheap to clone, and every clone refers to the same console. Any thread may
/// call [`Self::print()`]. At most one thread at a time should call
/// [`Self::read_line()`], and never the UI thread, since it blocks. The key and edit
/// methods are meant to be called from the UI context, normally through a
/// [`crate::ConsoleView`].
///
/// # Example
///
/// ```
/// use r3bl_console::{ConsoleEngine, ConsoleOptions, ConsoleView, MemorySurface,
///                    OutputStream, ReadLineEvent};
///
/// let (engine, receiver) = ConsoleEngine::new(ConsoleOptions::default());
/// let mut view = ConsoleView::new(engine.clone(), receiver, MemorySurface::new());
///
/// engine.load_script(["world"]);
/// let reader = {
///     let engine = engine.clone();
///     std::thread::spawn(move || engine.read_line())
/// };
/// assert_eq!(reader.join().unwrap(), ReadLineEvent::Line("world".into()));
///
/// engine.print("hello ", OutputStream::Stdout);
/// view.apply_pending_ops();
/// assert_eq!(engine.all_output(), "world\nhello ");
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleEngine {
    inner: Arc<EngineInner>,
}

impl ConsoleEngine {
    /// Create a console, and the receiving end of its surface op queue, which goes to a
    /// [`crate::ConsoleView`] in the UI context.
    #[must_use]
    pub fn new(options: ConsoleOptions) -> (Self, SurfaceOpReceiver) {
        let (ops, receiver) = surface_op_channel();
        let ConsoleOptions {
            settings,
            echo_devices,
            script_dirs,
            compare_settle_delay,
        } = options;

        let engine = Self {
            inner: Arc::new(EngineInner {
                flags: ConsoleFlags::default(),
                editor: StdMutex::new(InputEditor::default()),
                input: InputQueue::new(),
                output: OutputSink::new(echo_devices, ops.clone()),
                settings: StdMutex::new(settings),
                last_save_path: StdMutex::new(None),
                ops,
                script_dirs,
                compare_settle_delay,
            }),
        };
        engine.post_appearance();

        (engine, receiver)
    }

    fn lock_editor(&self) -> MutexGuard<'_, InputEditor> { lock_recover(&self.inner.editor) }

    fn lock_settings(&self) -> MutexGuard<'_, ConsoleSettings> {
        lock_recover(&self.inner.settings)
    }

    fn post(&self, op: SurfaceOp) { self.inner.ops.post(op); }

    fn style_for(&self, role: TextRole) -> TextStyle {
        let settings = self.lock_settings();
        match role {
            TextRole::Output => TextStyle {
                role,
                color: settings.output_color,
                bold: false,
            },
            TextRole::Error => TextStyle {
                role,
                color: settings.error_color,
                bold: false,
            },
            TextRole::UserInput | TextRole::PendingInput => TextStyle {
                role,
                color: settings.user_input_color,
                bold: true,
            },
        }
    }

    fn edit_context(&self) -> EditContext<'_> {
        EditContext {
            sink: &self.inner.output,
            ops: &self.inner.ops,
            pending_style: self.style_for(TextRole::PendingInput),
        }
    }

    fn post_appearance(&self) {
        let settings = self.settings();
        self.post(SurfaceOp::SetTitle(settings.title));
        self.post(SurfaceOp::SetFont(settings.font));
        self.post(SurfaceOp::SetBackground(settings.background));
    }
}

// ┌─────────────────────────────────────────────────────────────────────┐
// │ Output                                                              │
// └─────────────────────────────────────────────────────────────────────┘
impl ConsoleEngine {
    /// Print `text` to the transcript, in the error color for [`OutputStream::Stderr`].
    /// Any thread may call this. The text of one call is never interleaved with the
    /// text of another. No-op after shutdown.
    pub fn print(&self, text: impl AsRef<str>, stream: OutputStream) {
        early_return_if_shutdown!(self.inner.flags);
        let role = if stream.is_error() {
            TextRole::Error
        } else {
            TextRole::Output
        };
        let style = self.style_for(role);
        let echo = self.inner.flags.echo_enabled();
        self.inner.output.print(text.as_ref(), stream, style, echo);
    }

    pub fn println(&self, text: impl AsRef<str>, stream: OutputStream) {
        self.print(format!("{}\n", text.as_ref()), stream);
    }

    /// Wipe the transcript and the output log, if clearing is enabled. Any pending input
    /// is shown again afterwards. If clearing is disabled, a marker line is printed
    /// instead and nothing is wiped. No-op after shutdown.
    pub fn clear_console(&self) {
        early_return_if_shutdown!(self.inner.flags);

        if !self.inner.flags.clear_enabled() {
            self.println(CLEAR_MARKER, OutputStream::Stdout);
            return;
        }

        self.inner.output.clear_all(CLEAR_MARKER);
        let ctx = self.edit_context();
        self.lock_editor().restore_after_clear(&ctx);
        tracing::debug!(message = "Console cleared");
    }

    /// Everything printed so far (both streams), plus echoed input.
    #[must_use]
    pub fn all_output(&self) -> String { self.inner.output.all_output() }

    /// Save the transcript to the path it was last saved to. Returns `false` if it was
    /// never saved, the caller should ask for a path and use [`Self::save_as()`].
    /// After shutdown this does nothing, and returns `true` since there is no path left
    /// to ask for.
    pub fn save(&self) -> bool {
        early_return_if_shutdown!(self.inner.flags, true);
        let path = lock_recover(&self.inner.last_save_path).clone();
        match path {
            Some(path) => {
                self.post(SurfaceOp::SaveTranscript(path));
                true
            }
            None => false,
        }
    }

    /// No-op after shutdown.
    pub fn save_as(&self, path: impl Into<PathBuf>) {
        early_return_if_shutdown!(self.inner.flags);
        let path = path.into();
        *lock_recover(&self.inner.last_save_path) = Some(path.clone());
        self.post(SurfaceOp::SaveTranscript(path));
    }

    /// Show an informational message to the user.
    pub fn show_message(&self, title: impl Into<String>, message: impl Into<String>) {
        self.post(SurfaceOp::ShowMessage {
            title: title.into(),
            message: message.into(),
        });
    }
}

// ┌─────────────────────────────────────────────────────────────────────┐
// │ Input                                                               │
// └─────────────────────────────────────────────────────────────────────┘
impl ConsoleEngine {
    /// Block until a line is available and return it. Script lines are returned before
    /// typed lines, and are echoed to the transcript as if they were typed. Returns
    /// right away after end of input or shutdown.
    ///
    /// Never call this from the UI context.
    pub fn read_line(&self) -> ReadLineEvent {
        if self.inner.flags.is_shutdown() {
            return ReadLineEvent::Shutdown;
        }

        {
            let mut editor = self.lock_editor();
            editor.prompt_active = true;
            editor.focus_end();
        }
        self.post(SurfaceOp::FocusInput);
        tracing::debug!(message = "Prompt active");

        let event = match self.inner.input.next_blocking() {
            NextInput::Script(line) => {
                let style = self.style_for(TextRole::UserInput);
                self.inner.output.echo_input_line(&line, style);
                ReadLineEvent::Line(line)
            }
            NextInput::Typed(line) => ReadLineEvent::Line(line),
            NextInput::Eof => ReadLineEvent::Eof,
            NextInput::Shutdown => ReadLineEvent::Shutdown,
        };

        self.lock_editor().prompt_active = false;
        tracing::debug!(message = "Prompt done", ?event);

        if let ReadLineEvent::Line(line) = &event {
            if self.inner.flags.echo_enabled() {
                self.inner
                    .output
                    .echo_devices()
                    .echo(&format!("{line}\n"), OutputStream::Stdout)
                    .report();
            }
        }

        event
    }

    /// Same as [`Self::read_line()`], with `""` for end of input and shutdown.
    pub fn read_line_or_empty(&self) -> String { self.read_line().into_line() }

    /// Enter: move the pending input into the input queue and the history, and start a
    /// new line in the transcript. No-op after shutdown.
    pub fn submit_line(&self) {
        early_return_if_shutdown!(self.inner.flags);
        let style = self.style_for(TextRole::UserInput);

        let mut editor = self.lock_editor();
        let (line, span) = editor.take_line();
        self.inner.input.push_typed(line.clone());
        self.inner.output.submit_input_line(&line, span, style);
        drop(editor);

        tracing::debug!(message = "Line submitted", chars = line.chars().count());
    }

    /// Signal end of input, but only on an empty line. Returns whether it was signalled.
    pub fn process_eof(&self) -> bool {
        let editor = self.lock_editor();
        if !editor.buffer.is_empty() {
            return false;
        }
        self.inner.input.signal_eof();
        drop(editor);

        tracing::debug!(message = "End of input signalled");
        true
    }

    /// Replace the script queue with `lines`. Returns how many lines were loaded, `0`
    /// after shutdown.
    pub fn load_script<I, L>(&self, lines: I) -> usize
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        early_return_if_shutdown!(self.inner.flags, 0);
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let count = lines.len();
        let discarded = self.inner.input.load_script(lines);
        tracing::info!(message = "Input script loaded", count, discarded);
        count
    }

    /// # Errors
    ///
    /// Returns [`ConsoleError::FileNotFound`] or [`ConsoleError::Io`] if the file can't
    /// be read. The user is also shown a message.
    pub fn load_script_file(&self, path: &Path) -> ConsoleResult<usize> {
        match read_script_lines(path) {
            Ok(lines) => Ok(self.load_script(lines)),
            Err(error) => {
                self.show_message("Input Script", error.to_string());
                Err(error)
            }
        }
    }

    /// Look for `input-<number>.txt` and `expected-output-<number>.txt` in the script
    /// dirs. The input is loaded right away. The expected output is compared with
    /// everything printed, on a background thread, once the settle delay has passed.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::ScriptNotFound`] if neither file exists (the user is also
    /// shown a message), or the error from loading the input script.
    pub fn load_script_number(&self, number: u8) -> ConsoleResult<ScriptPair> {
        let pair = discover_script_pair(number, &self.inner.script_dirs);

        if pair.is_empty() {
            let searched = self
                .inner
                .script_dirs
                .iter()
                .map(|it| it.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let error = ConsoleError::ScriptNotFound { number, searched };
            self.show_message("Input Script", error.to_string());
            return Err(error);
        }

        if let Some(input) = &pair.input {
            self.load_script_file(input)?;
        }
        if let Some(expected_output) = &pair.expected_output {
            self.compare_output_later(expected_output.clone())?;
        }

        Ok(pair)
    }

    /// Compare the contents of `expected_output_path` with everything printed so far, and
    /// show the result to the user.
    pub fn compare_output(&self, expected_output_path: &Path) -> OutputComparison {
        let expected = read_expected_output(expected_output_path);
        let comparison = OutputComparison::new(expected, self.all_output());
        tracing::info!(
            message = "Compared output",
            path = ?expected_output_path,
            matches = comparison.matches()
        );
        self.post(SurfaceOp::ShowComparison(comparison.clone()));
        comparison
    }

    /// [`Self::compare_output()`] on a background thread, after the settle delay.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Io`] if the thread can't be spawned.
    pub fn compare_output_later(
        &self,
        expected_output_path: PathBuf,
    ) -> ConsoleResult<JoinHandle<OutputComparison>> {
        let engine = self.clone();
        let delay = self.inner.compare_settle_delay;
        let handle = std::thread::Builder::new()
            .name("console-compare-output".into())
            .spawn(move || {
                std::thread::sleep(delay);
                engine.compare_output(&expected_output_path)
            })?;
        Ok(handle)
    }

    #[must_use]
    pub fn pending_script_lines(&self) -> usize { self.inner.input.script_len() }

    #[must_use]
    pub fn pending_typed_lines(&self) -> usize { self.inner.input.typed_len() }
}

// ┌─────────────────────────────────────────────────────────────────────┐
// │ Editing the pending input                                           │
// └─────────────────────────────────────────────────────────────────────┘
impl ConsoleEngine {
    /// Type one char at the cursor. Control chars are ignored. Typing ahead (before
    /// `read_line()` is called) is allowed. No-op after shutdown.
    pub fn type_char(&self, ch: char) {
        early_return_if_shutdown!(self.inner.flags);
        if ch.is_control() {
            return;
        }
        let ctx = self.edit_context();
        let mut utf8 = [0_u8; 4];
        self.lock_editor().insert_text(ch.encode_utf8(&mut utf8), &ctx);
    }

    /// Backspace. No-op after shutdown.
    pub fn backspace(&self) -> bool {
        early_return_if_shutdown!(self.inner.flags, false);
        let ctx = self.edit_context();
        self.lock_editor().delete_backward(&ctx)
    }

    /// Delete key. No-op after shutdown.
    pub fn delete_forward(&self) -> bool {
        early_return_if_shutdown!(self.inner.flags, false);
        let ctx = self.edit_context();
        self.lock_editor().delete_forward(&ctx)
    }

    /// Replace the pending input with `text`, as if the user had typed it.
    pub fn set_user_input(&self, text: &str) {
        early_return_if_shutdown!(self.inner.flags);
        let ctx = self.edit_context();
        self.lock_editor().replace_all(text, &ctx);
    }

    /// Move through the history by `delta` (negative is older) and put the recalled
    /// entry (or `""` past either end) in the pending input. Returns the recalled text.
    ///
    /// This does not check where the cursor is. Up / Down only get here while the
    /// cursor is in the pending input, see [`Self::handle_key()`].
    pub fn navigate_history(&self, delta: isize) -> String {
        early_return_if_shutdown!(self.inner.flags, String::new());
        let ctx = self.edit_context();
        let mut editor = self.lock_editor();
        let recalled = editor.history.navigate(delta).to_string();
        editor.replace_all(&recalled, &ctx);
        recalled
    }

    /// Paste: `\r` is dropped, `\n` submits the line, everything else is typed.
    pub fn paste(&self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\r' => {}
                '\n' => self.submit_line(),
                _ => self.type_char(ch),
            }
        }
    }

    /// Cut the selection, if it is inside the pending input. Returns the cut text.
    pub fn cut_selection(&self) -> Option<String> {
        early_return_if_shutdown!(self.inner.flags, None);
        let ctx = self.edit_context();
        self.lock_editor().delete_selection(&ctx)
    }

    /// Record where the cursor and selection are. Called by the view before each edit.
    pub fn place_cursor(&self, placement: CursorPlacement, selection: Option<Range<usize>>) {
        self.lock_editor().place_cursor(placement, selection);
    }

    #[must_use]
    pub fn pending_input(&self) -> String { self.lock_editor().buffer.text() }

    #[must_use]
    pub fn cursor_placement(&self) -> CursorPlacement { self.lock_editor().cursor_placement() }

    #[must_use]
    pub fn history(&self) -> Vec<String> { self.lock_editor().history.entries().to_vec() }

    #[must_use]
    pub fn history_index(&self) -> isize { self.lock_editor().history.index() }

    /// Handle one key press from the UI context. See [`crate::decode_key()`] for the
    /// key bindings.
    pub fn handle_key(&self, press: KeyPress) -> KeyOutcome {
        let command = decode_key(press);

        if self.inner.flags.is_shutdown() && !command.is_shortcut() {
            return match command {
                KeyCommand::PassThrough => KeyOutcome::Ignored,
                _ => KeyOutcome::Consumed,
            };
        }

        match command {
            KeyCommand::Eof => {
                self.process_eof();
            }
            KeyCommand::Clear => self.clear_console(),
            KeyCommand::LoadScript(number) => {
                if let Err(error) = self.load_script_number(number) {
                    tracing::debug!(message = "Numbered script not loaded", %error);
                }
            }
            KeyCommand::Close => self.close(),
            KeyCommand::Save => {
                if !self.save() {
                    return KeyOutcome::Action(ConsoleAction::SaveAs);
                }
            }
            KeyCommand::SaveAs => return KeyOutcome::Action(ConsoleAction::SaveAs),
            KeyCommand::FontGrow => self.grow_font(),
            KeyCommand::FontShrink => self.shrink_font(),
            KeyCommand::FontReset => self.reset_font(),
            KeyCommand::Copy => return KeyOutcome::Action(ConsoleAction::Copy),
            KeyCommand::Cut => return KeyOutcome::Action(ConsoleAction::Cut),
            KeyCommand::Paste => return KeyOutcome::Action(ConsoleAction::Paste),
            KeyCommand::ShowAbout => return KeyOutcome::Action(ConsoleAction::ShowAbout),
            KeyCommand::Type(ch) => self.type_char(ch),
            KeyCommand::Submit => self.submit_line(),
            KeyCommand::Backspace => {
                self.backspace();
            }
            KeyCommand::DeleteForward => {
                self.delete_forward();
            }
            KeyCommand::Home { extend } => return self.move_to_input_edge(false, extend),
            KeyCommand::End { extend } => return self.move_to_input_edge(true, extend),
            KeyCommand::Left { extend } => return self.step_cursor(-1, extend),
            KeyCommand::Right { extend } => return self.step_cursor(1, extend),
            KeyCommand::HistoryOlder => return self.navigate_history_key(-1),
            KeyCommand::HistoryNewer => return self.navigate_history_key(1),
            KeyCommand::Swallow => {}
            KeyCommand::PassThrough => return KeyOutcome::Ignored,
        }

        KeyOutcome::Consumed
    }

    /// Home / End while a read is outstanding always land in the pending input (or at
    /// the end of the transcript if there is none).
    fn move_to_input_edge(&self, to_end: bool, extend: bool) -> KeyOutcome {
        let ctx = self.edit_context();
        let mut editor = self.lock_editor();
        if !editor.prompt_active {
            return KeyOutcome::Ignored;
        }
        let extend = extend && editor.is_cursor_in_input();
        let target = if to_end { editor.buffer.len() } else { 0 };
        if !editor.move_cursor(target, extend, &ctx) {
            self.post(SurfaceOp::FocusInput);
        }
        KeyOutcome::Consumed
    }

    /// Left / Right are bounded by the pending input while the cursor is in it.
    fn step_cursor(&self, delta: isize, extend: bool) -> KeyOutcome {
        let ctx = self.edit_context();
        let mut editor = self.lock_editor();
        if !editor.is_cursor_in_input() {
            return KeyOutcome::Ignored;
        }
        let target = editor.buffer.cursor().saturating_add_signed(delta);
        editor.move_cursor(target, extend, &ctx);
        KeyOutcome::Consumed
    }

    fn navigate_history_key(&self, delta: isize) -> KeyOutcome {
        if !self.lock_editor().is_cursor_in_input() {
            return KeyOutcome::Ignored;
        }
        self.navigate_history(delta);
        KeyOutcome::Consumed
    }
}

// ┌─────────────────────────────────────────────────────────────────────┐
// │ State and lifecycle                                                 │
// └─────────────────────────────────────────────────────────────────────┘
impl ConsoleEngine {
    #[must_use]
    pub fn state(&self) -> ConsoleState {
        let flags = &self.inner.flags;
        ConsoleState {
            prompt_active: self.lock_editor().prompt_active,
            shutting_down: flags.is_shutdown(),
            echo_enabled: flags.echo_enabled(),
            input_locked: flags.is_locked(),
        }
    }

    /// `Idle`, `Prompting`, or `Shutdown`.
    #[must_use]
    pub fn liveness(&self) -> ConsoleLiveness { self.state().liveness() }

    #[must_use]
    pub fn is_shutdown(&self) -> bool { self.inner.flags.is_shutdown() }

    /// Stop the console for good: a blocked reader is woken up with
    /// [`ReadLineEvent::Shutdown`], the surface stops being editable, and the title gets
    /// [`COMPLETED_TITLE_SUFFIX`] (once). Calling this again does nothing.
    pub fn shutdown(&self) {
        if !self.inner.flags.begin_shutdown() {
            return;
        }

        self.inner.output.flush_echo();
        self.inner.input.signal_shutdown();
        self.lock_editor().prompt_active = false;

        let title = {
            let mut settings = self.lock_settings();
            if !settings.title.ends_with(COMPLETED_TITLE_SUFFIX) {
                settings.title.push_str(COMPLETED_TITLE_SUFFIX);
            }
            settings.title.clone()
        };
        self.post(SurfaceOp::SetEditable(false));
        self.post(SurfaceOp::SetTitle(title));

        tracing::info!(message = "Console shut down");
    }

    /// Shut down, and close the surface.
    pub fn close(&self) {
        self.shutdown();
        self.post(SurfaceOp::Close);
    }

    /// Echo of printed text and of read lines to the real process streams. Returns
    /// `false` (and does nothing) while locked or after shutdown.
    pub fn set_echo(&self, enabled: bool) -> bool { self.inner.flags.set_echo_enabled(enabled) }

    /// Returns `false` (and does nothing) while locked or after shutdown.
    pub fn set_clear_enabled(&self, enabled: bool) -> bool {
        self.inner.flags.set_clear_enabled(enabled)
    }

    /// While locked, echo and clearing can't be changed.
    pub fn set_locked(&self, locked: bool) { self.inner.flags.set_locked(locked); }

    #[must_use]
    pub fn is_clear_enabled(&self) -> bool { self.inner.flags.clear_enabled() }

    /// Streams to hand to a program that expects stdin, stdout and stderr.
    #[must_use]
    pub fn streams(&self) -> ConsoleStreams { ConsoleStreams::new(self) }

    #[must_use]
    pub fn writer(&self, stream: OutputStream) -> ConsoleWriter {
        ConsoleWriter::new(self.clone(), stream)
    }

    #[must_use]
    pub fn stdin(&self) -> ConsoleStdin { ConsoleStdin::new(self.clone()) }
}

// ┌─────────────────────────────────────────────────────────────────────┐
// │ Appearance                                                          │
// └─────────────────────────────────────────────────────────────────────┘
impl ConsoleEngine {
    #[must_use]
    pub fn settings(&self) -> ConsoleSettings { self.lock_settings().clone() }

    /// Recolor everything printed so far, and use `color` for future output. The pending
    /// input keeps its own color if the surface can address it.
    pub fn set_output_color(&self, color: ConsoleColor) {
        early_return_if_shutdown!(self.inner.flags);
        self.lock_settings().output_color = color;
        self.post(SurfaceOp::Recolor(color));
    }

    /// Used for future error output only.
    pub fn set_error_color(&self, color: ConsoleColor) {
        early_return_if_shutdown!(self.inner.flags);
        self.lock_settings().error_color = color;
    }

    /// No-op after shutdown, like every appearance setter.
    pub fn set_background(&self, color: ConsoleColor) {
        early_return_if_shutdown!(self.inner.flags);
        self.lock_settings().background = color;
        self.post(SurfaceOp::SetBackground(color));
    }

    pub fn set_font(&self, font: FontSpec) {
        early_return_if_shutdown!(self.inner.flags);
        self.lock_settings().font = font.clone();
        self.post(SurfaceOp::SetFont(font));
    }

    pub fn grow_font(&self) { self.change_font(|font| font.grown()); }

    pub fn shrink_font(&self) { self.change_font(|font| font.shrunk()); }

    pub fn reset_font(&self) { self.change_font(|_| Some(FontSpec::default())); }

    fn change_font(&self, change: impl FnOnce(&FontSpec) -> Option<FontSpec>) {
        early_return_if_shutdown!(self.inner.flags);
        let changed = {
            let mut settings = self.lock_settings();
            let changed = change(&settings.font);
            if let Some(font) = &changed {
                settings.font = font.clone();
            }
            changed
        };
        if let Some(font) = changed {
            self.post(SurfaceOp::SetFont(font));
        }
    }

    /// After shutdown the title keeps its [`COMPLETED_TITLE_SUFFIX`], and can't be
    /// changed.
    pub fn set_title(&self, title: impl Into<String>) {
        early_return_if_shutdown!(self.inner.flags);
        let title = title.into();
        self.lock_settings().title.clone_from(&title);
        self.post(SurfaceOp::SetTitle(title));
    }

    /// Apply the settings file at `path`, and show the result. Nothing is applied after
    /// shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::FileNotFound`] or [`ConsoleError::Io`] if the file can't
    /// be read.
    pub fn load_configuration(&self, path: &Path) -> ConsoleResult<Vec<ConfigKey>> {
        early_return_if_shutdown!(self.inner.flags, ok!(vec![]));

        // Parsing logs skipped lines, so it can't happen under the settings lock.
        let mut settings = self.settings();
        let applied = settings.try_load_from(path)?;
        {
            let mut current = self.lock_settings();
            current.font = settings.font.clone();
            current.background = settings.background;
            current.output_color = settings.output_color;
        }

        self.post(SurfaceOp::SetBackground(settings.background));
        self.post(SurfaceOp::SetFont(settings.font));
        self.post(SurfaceOp::Recolor(settings.output_color));
        Ok(applied)
    }

    /// # Errors
    ///
    /// Returns [`ConsoleError::Io`] if the file can't be written.
    pub fn save_configuration(&self, path: &Path) -> ConsoleResult<()> {
        self.settings().save_to(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConsoleKey, EchoDevice, NamedColor, drain_surface_ops,
                test_fixtures::StdoutMock};
    use pretty_assertions::assert_eq;
    use std::thread;

    fn mocked_options() -> (ConsoleOptions, StdoutMock) {
        let out = StdoutMock::new();
        let options = ConsoleOptions {
            echo_devices: EchoDevices {
                stdout: EchoDevice::new_mock(out.clone()),
                stderr: EchoDevice::new_mock(StdoutMock::new()),
            },
            compare_settle_delay: Duration::from_millis(1),
            ..ConsoleOptions::default()
        };
        (options, out)
    }

    fn new_engine() -> (ConsoleEngine, SurfaceOpReceiver, StdoutMock) {
        let (options, out) = mocked_options();
        let (engine, receiver) = ConsoleEngine::new(options);
        (engine, receiver, out)
    }

    fn type_str(engine: &ConsoleEngine, text: &str) {
        for ch in text.chars() {
            engine.type_char(ch);
        }
    }

    #[test]
    fn test_submit_then_read_line() {
        let (engine, _receiver, _out) = new_engine();
        type_str(&engine, "hello");
        engine.submit_line();

        assert_eq!(engine.read_line(), ReadLineEvent::Line("hello".into()));
        assert_eq!(engine.history().last().map(String::as_str), Some("hello"));
        assert_eq!(engine.history_index(), 1);
        assert_eq!(engine.pending_input(), "");
        assert_eq!(engine.all_output(), "hello\n");
    }

    #[test]
    fn test_history_navigation_recalls_into_pending_input() {
        let (engine, _receiver, _out) = new_engine();
        for line in ["a", "b"] {
            type_str(&engine, line);
            engine.submit_line();
        }

        assert_eq!(engine.navigate_history(-1), "b");
        assert_eq!(engine.pending_input(), "b");
        assert_eq!(engine.navigate_history(-1), "a");
        assert_eq!(engine.navigate_history(-1), "");
        assert_eq!(engine.navigate_history(-1), "");
        assert_eq!(engine.pending_input(), "");
    }

    #[test]
    fn test_history_keys_only_work_while_prompting() {
        let (engine, _receiver, _out) = new_engine();
        type_str(&engine, "a");
        engine.submit_line();

        let up = KeyPress::plain(ConsoleKey::Up);
        assert_eq!(engine.handle_key(up), KeyOutcome::Ignored);
        assert_eq!(engine.pending_input(), "");
    }

    #[test]
    fn test_script_lines_are_echoed_as_typed() {
        let (engine, _receiver, _out) = new_engine();
        engine.load_script(["1", "2"]);
        assert_eq!(engine.read_line_or_empty(), "1");
        assert_eq!(engine.read_line_or_empty(), "2");
        assert_eq!(engine.all_output(), "1\n2\n");
    }

    #[test]
    fn test_eof_only_on_empty_line() {
        let (engine, _receiver, _out) = new_engine();
        type_str(&engine, "x");
        assert!(!engine.process_eof());
        assert_eq!(
            engine.handle_key(KeyPress::ctrl(ConsoleKey::Char('d'))),
            KeyOutcome::Consumed
        );
        assert_eq!(engine.pending_input(), "x");

        engine.backspace();
        assert!(engine.process_eof());
        assert_eq!(engine.read_line(), ReadLineEvent::Eof);
        assert_eq!(engine.read_line_or_empty(), "");
    }

    #[test]
    fn test_print_echo_and_shutdown() {
        let (engine, _receiver, out) = new_engine();
        engine.print("silent", OutputStream::Stdout);
        assert!(engine.set_echo(true));
        engine.print("loud\n", OutputStream::Stdout);
        assert_eq!(out.get_copy_of_buffer_as_string(), "loud\n");

        engine.shutdown();
        engine.print("ignored", OutputStream::Stderr);
        assert_eq!(engine.all_output(), "silentloud\n");
        assert_eq!(engine.read_line(), ReadLineEvent::Shutdown);
        assert!(!engine.set_echo(false));
    }

    #[test]
    fn test_read_line_echoes_to_stdout() {
        let (engine, _receiver, out) = new_engine();
        engine.set_echo(true);
        engine.load_script(["scripted"]);
        engine.read_line();
        assert_eq!(out.get_copy_of_buffer_as_string(), "scripted\n");
    }

    #[test]
    fn test_shutdown_wakes_blocked_reader() {
        let (engine, _receiver, _out) = new_engine();
        let reader = {
            let engine = engine.clone();
            thread::spawn(move || engine.read_line())
        };
        while !engine.state().prompt_active {
            thread::yield_now();
        }
        assert_eq!(engine.liveness(), ConsoleLiveness::Prompting);
        engine.shutdown();
        assert_eq!(reader.join().unwrap(), ReadLineEvent::Shutdown);
        assert!(!engine.state().prompt_active);
        assert_eq!(engine.liveness(), ConsoleLiveness::Shutdown);
    }

    #[test]
    fn test_shutdown_marks_title_once() {
        let (engine, mut receiver, _out) = new_engine();
        drain_surface_ops(&mut receiver);

        engine.shutdown();
        engine.shutdown();

        let titles: Vec<_> = drain_surface_ops(&mut receiver)
            .into_iter()
            .filter_map(|op| match op {
                SurfaceOp::SetTitle(title) => Some(title),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec![format!("Console{COMPLETED_TITLE_SUFFIX}")]);
        assert!(engine.state().shutting_down);
    }

    #[test]
    fn test_settings_and_scripts_are_frozen_after_shutdown() {
        let (engine, mut receiver, _out) = new_engine();
        engine.shutdown();
        drain_surface_ops(&mut receiver);
        let before = engine.settings();

        engine.set_title("x");
        engine.set_output_color(ConsoleColor::Named(NamedColor::Green));
        engine.set_error_color(ConsoleColor::Named(NamedColor::Green));
        engine.set_background(ConsoleColor::Named(NamedColor::Green));
        engine.set_font(FontSpec::default().grown().unwrap());
        engine.grow_font();
        engine.save_as("/tmp/transcript.txt");
        assert!(engine.save());
        assert_eq!(engine.load_script(["late"]), 0);
        let applied = engine
            .load_configuration(Path::new("/no/such/console-settings.txt"))
            .unwrap();
        assert!(applied.is_empty());

        assert_eq!(engine.settings().title, "Console [completed]");
        assert_eq!(engine.settings(), before);
        assert_eq!(engine.pending_script_lines(), 0);
        assert!(drain_surface_ops(&mut receiver).is_empty());
    }

    #[test]
    fn test_clear_enabled_and_disabled() {
        let (engine, _receiver, out) = new_engine();
        engine.print("some output\n", OutputStream::Stdout);

        engine.clear_console();
        assert_eq!(engine.all_output(), "");
        assert_eq!(out.get_copy_of_buffer_as_string(), format!("{CLEAR_MARKER}\n"));

        engine.print("more\n", OutputStream::Stdout);
        assert!(engine.set_clear_enabled(false));
        engine.clear_console();
        assert_eq!(engine.all_output(), format!("more\n{CLEAR_MARKER}\n"));
    }

    #[test]
    fn test_lock_freezes_echo_and_clear() {
        let (engine, _receiver, _out) = new_engine();
        engine.set_locked(true);
        assert!(!engine.set_clear_enabled(false));
        assert!(engine.is_clear_enabled());
        assert!(!engine.state().echo_enabled);
        assert!(engine.state().input_locked);
    }

    #[test]
    fn test_paste_submits_on_newline() {
        let (engine, _receiver, _out) = new_engine();
        engine.paste("one\r\ntw");
        assert_eq!(engine.read_line_or_empty(), "one");
        assert_eq!(engine.pending_input(), "tw");
    }

    #[test]
    fn test_save_without_path_asks_for_one() {
        let (engine, mut receiver, _out) = new_engine();
        let save = KeyPress::ctrl(ConsoleKey::Char('s'));
        assert_eq!(engine.handle_key(save), KeyOutcome::Action(ConsoleAction::SaveAs));

        engine.save_as("/tmp/transcript.txt");
        drain_surface_ops(&mut receiver);
        assert_eq!(engine.handle_key(save), KeyOutcome::Consumed);
        assert_eq!(drain_surface_ops(&mut receiver), vec![SurfaceOp::SaveTranscript(
            PathBuf::from("/tmp/transcript.txt")
        )]);
    }

    #[test]
    fn test_font_shortcuts() {
        let (engine, _receiver, _out) = new_engine();
        let size = engine.settings().font.size;
        engine.handle_key(KeyPress::ctrl(ConsoleKey::Char('+')));
        assert_eq!(engine.settings().font.size, size + 1);
        engine.handle_key(KeyPress::ctrl(ConsoleKey::Char('0')));
        assert_eq!(engine.settings().font, FontSpec::default());
    }

    #[test]
    fn test_set_output_color_posts_recolor() {
        let (engine, mut receiver, _out) = new_engine();
        drain_surface_ops(&mut receiver);
        let green = ConsoleColor::Named(NamedColor::Green);
        engine.set_output_color(green);
        assert_eq!(drain_surface_ops(&mut receiver), vec![SurfaceOp::Recolor(green)]);
        assert_eq!(engine.settings().output_color, green);
    }

    #[test]
    fn test_load_script_number_and_compare() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("input-2.txt"), "first\nsecond\n").unwrap();
        std::fs::write(dir.path().join("expected-output-2.txt"), "first\nsecond\n").unwrap();

        let (mut options, _out) = mocked_options();
        options.script_dirs = vec![dir.path().to_path_buf()];
        options.compare_settle_delay = Duration::from_secs(60);
        let (engine, mut receiver) = ConsoleEngine::new(options);

        let pair = engine.load_script_number(2).unwrap();
        assert!(pair.input.is_some());
        assert_eq!(engine.pending_script_lines(), 2);

        engine.read_line();
        engine.read_line();
        let comparison = engine.compare_output(&pair.expected_output.unwrap());
        assert!(comparison.matches());
        assert!(
            drain_surface_ops(&mut receiver)
                .iter()
                .any(|op| matches!(op, SurfaceOp::ShowComparison(it) if it.matches()))
        );
    }

    #[test]
    fn test_missing_numbered_script_shows_message() {
        let dir = tempfile::tempdir().unwrap();
        let (mut options, _out) = mocked_options();
        options.script_dirs = vec![dir.path().to_path_buf()];
        let (engine, mut receiver) = ConsoleEngine::new(options);
        drain_surface_ops(&mut receiver);

        let result = engine.load_script_number(7);
        assert!(matches!(result, Err(ConsoleError::ScriptNotFound { number: 7, .. })));
        assert!(matches!(
            drain_surface_ops(&mut receiver).as_slice(),
            [SurfaceOp::ShowMessage { .. }]
        ));
    }
}
