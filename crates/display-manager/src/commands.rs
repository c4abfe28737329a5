use std::{
    io::{self, Write},
    thread,
    time::{Duration, Instant},
};

use display_identity::{
    DeviceEnumerator, DisplayCollection, DisplayIdentity, InputSourcesError, MonitorControl,
    RefreshError,
};
use mccs_capabilities::InputSource;
use thiserror::Error;
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    cli::{Command, ProfileCommand},
    config::{Config, Profile},
    select::select,
};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

type Handle<D> = <D as DeviceEnumerator>::Handle;
type DisplayError<D> = <D as DeviceEnumerator>::Error;

#[derive(Debug, Error)]
pub enum CommandError<E: core::error::Error + 'static> {
    #[error("Failed to identify the connected displays:\n{0}")]
    Refresh(#[from] RefreshError<E>),

    #[error("No display matches '{0}'")]
    NoSuchDisplay(String),

    #[error("Failed to list input sources:\n{0}")]
    InputSources(#[from] InputSourcesError<E>),

    #[error("Failed to talk to the display:\n{0}")]
    Control(#[source] E),

    #[error("'{0}' is not a two digit hex input code")]
    InvalidCode(String),

    #[error("{display} did not switch to input {code} within {timeout_ms}ms")]
    Timeout {
        display: String,
        code: String,
        timeout_ms: u64,
    },

    #[error("No profile named '{0}'")]
    NoSuchProfile(String),

    #[error("Failed to write output:\n{0}")]
    Output(#[from] io::Error),
}

/// The connected displays and the config one command runs against.
pub struct Session<'a, D: DeviceEnumerator, W> {
    displays: &'a D,
    collection: DisplayCollection<Handle<D>>,
    config: &'a mut Config,
    out: W,
}

impl<'a, D, W> Session<'a, D, W>
where
    D: DeviceEnumerator + MonitorControl<Handle = Handle<D>, Error = DisplayError<D>>,
    W: Write,
{
    /// Identifies the connected displays.
    pub fn new(
        displays: &'a D,
        config: &'a mut Config,
        out: W,
    ) -> Result<Self, CommandError<DisplayError<D>>> {
        let mut collection = DisplayCollection::new();
        collection.refresh(displays)?;

        Ok(Self {
            displays,
            collection,
            config,
            out,
        })
    }

    pub fn run(&mut self, command: Command) -> Result<(), CommandError<DisplayError<D>>> {
        match command {
            Command::List => self.list(),
            Command::Inputs { display } => self.inputs(&display),
            Command::Current { display } => self.current(&display),
            Command::Set { display, code } => {
                let display = self.find(&display)?;
                self.switch(&display, &code)
            }
            Command::Rename { display, name } => self.rename(&display, &name),
            Command::Profile { command } => match command {
                ProfileCommand::Save { name } => self.save_profile(name),
                ProfileCommand::Load { name } => self.load_profile(&name),
                ProfileCommand::Toggle { first, second } => self.toggle_profile(&first, &second),
                ProfileCommand::List => self.list_profiles(),
            },
        }
    }

    fn find(
        &self,
        selector: &str,
    ) -> Result<DisplayIdentity<Handle<D>>, CommandError<DisplayError<D>>> {
        select(self.collection.displays(), &*self.config, selector)
            .cloned()
            .ok_or_else(|| CommandError::NoSuchDisplay(selector.to_string()))
    }

    fn name(&self, display: &DisplayIdentity<Handle<D>>) -> String {
        self.config
            .display_name(&display.serial, &display.friendly_name)
            .to_string()
    }

    fn list(&mut self) -> Result<(), CommandError<DisplayError<D>>> {
        let displays = self.collection.snapshot();

        if displays.is_empty() {
            writeln!(self.out, "No displays found")?;
        }

        for (index, display) in displays.iter().enumerate() {
            writeln!(
                self.out,
                "{index}: {} [{}] {}",
                self.config
                    .display_name(&display.serial, &display.friendly_name),
                display.serial,
                display.source_device_name
            )?;
        }

        Ok(())
    }

    #[instrument(skip(self), err)]
    fn inputs(&mut self, selector: &str) -> Result<(), CommandError<DisplayError<D>>> {
        let identity = self.find(selector)?;
        let name = self.name(&identity);

        let Some(mut sources) = self.displays.input_sources(&identity.handle)? else {
            writeln!(self.out, "{name} does not support switching inputs")?;
            return Ok(());
        };
        sources.sort();

        let current = self
            .displays
            .current_input(&identity.handle)
            .inspect_err(|e| warn!("Could not read the current input of {identity}: {e}"))
            .ok();

        for source in sources {
            let marker = if current.as_ref() == Some(&source) {
                '*'
            } else {
                ' '
            };
            writeln!(self.out, "{marker} {}  {}", source.code, source.label)?;
        }

        Ok(())
    }

    fn current(&mut self, selector: &str) -> Result<(), CommandError<DisplayError<D>>> {
        let display = self.find(selector)?;

        let current = self
            .displays
            .current_input(&display.handle)
            .map_err(CommandError::Control)?;

        writeln!(self.out, "{}  {}", current.code, current.label)?;

        Ok(())
    }

    /// Switches a display to `code` and waits for it to report the new input.
    #[instrument(skip(self, identity), fields(display = %identity), err)]
    fn switch(
        &mut self,
        identity: &DisplayIdentity<Handle<D>>,
        code: &str,
    ) -> Result<(), CommandError<DisplayError<D>>> {
        if code.len() != 2 || !code.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(CommandError::InvalidCode(code.to_string()));
        }

        let target = InputSource::from_code(code.to_ascii_uppercase());
        let value = target
            .value()
            .ok_or_else(|| CommandError::InvalidCode(code.to_string()))?;
        let name = self.name(identity);

        let current = self
            .displays
            .current_input(&identity.handle)
            .map_err(CommandError::Control)?;

        if current.code == target.code {
            info!("{identity} is already showing {}", target.code);
            writeln!(self.out, "{name} is already on {}  {}", target.code, target.label)?;
            return Ok(());
        }

        self.displays
            .set_input_select(&identity.handle, value)
            .map_err(CommandError::Control)?;

        let elapsed = self.wait_for_input(identity, &target.code)?;
        info!(
            "{identity} switched to {} in {}ms",
            target.code,
            elapsed.as_millis()
        );

        writeln!(self.out, "{name} switched to {}  {}", target.code, target.label)?;

        Ok(())
    }

    fn wait_for_input(
        &self,
        identity: &DisplayIdentity<Handle<D>>,
        target: &str,
    ) -> Result<Duration, CommandError<DisplayError<D>>> {
        let timeout_ms = self.config.input_change_timeout_ms;
        let timeout = Duration::from_millis(timeout_ms);
        let start = Instant::now();

        loop {
            match self.displays.current_input(&identity.handle) {
                Ok(current) if current.code == target => return Ok(start.elapsed()),
                Ok(current) => trace!("Still showing {}", current.code),
                // Displays often stop replying while they switch.
                Err(e) => debug!("No reply while switching: {e}"),
            }

            if start.elapsed() >= timeout {
                return Err(CommandError::Timeout {
                    display: self.name(identity),
                    code: target.to_string(),
                    timeout_ms,
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    fn rename(&mut self, selector: &str, name: &str) -> Result<(), CommandError<DisplayError<D>>> {
        let display = self.find(selector)?;
        let name = name.trim();

        if name.is_empty() {
            self.config.names.remove(&display.serial);
            writeln!(
                self.out,
                "{} uses its own name again",
                display.friendly_name
            )?;
        } else {
            self.config
                .names
                .insert(display.serial.clone(), name.to_string());
            writeln!(self.out, "{} is now {name}", display.friendly_name)?;
        }

        Ok(())
    }

    #[instrument(skip(self), err)]
    fn save_profile(&mut self, name: String) -> Result<(), CommandError<DisplayError<D>>> {
        let mut profile = Profile::new();

        for display in self.collection.displays() {
            let current = self
                .displays
                .current_input(&display.handle)
                .map_err(CommandError::Control)?;

            profile.insert(display.serial.clone(), current.code);
        }

        writeln!(
            self.out,
            "Saved profile {name} with {} display(s)",
            profile.len()
        )?;
        self.config.profiles.insert(name, profile);

        Ok(())
    }

    #[instrument(skip(self), err)]
    fn load_profile(&mut self, name: &str) -> Result<(), CommandError<DisplayError<D>>> {
        let profile = self
            .config
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| CommandError::NoSuchProfile(name.to_string()))?;

        for serial in profile.keys() {
            if self.collection.by_serial(serial).is_none() {
                warn!("Display {serial} from profile {name} is not connected");
            }
        }

        let displays = self.collection.snapshot();
        for identity in displays.iter() {
            match profile.get(&identity.serial) {
                Some(code) => self.switch(identity, code)?,
                None => debug!("Profile {name} does not include {identity}"),
            }
        }

        self.config.last_profile = Some(name.to_string());

        Ok(())
    }

    /// Loads `first`, or `second` if `first` was the last profile loaded.
    fn toggle_profile(
        &mut self,
        first: &str,
        second: &str,
    ) -> Result<(), CommandError<DisplayError<D>>> {
        let next = if self.config.last_profile.as_deref() == Some(first) {
            second
        } else {
            first
        };
        debug!("Toggling to profile {next}");

        self.load_profile(next)
    }

    fn list_profiles(&mut self) -> Result<(), CommandError<DisplayError<D>>> {
        if self.config.profiles.is_empty() {
            writeln!(self.out, "No profiles saved")?;
        }

        for (name, profile) in &self.config.profiles {
            writeln!(self.out, "{name}: {} display(s)", profile.len())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        cli::{Command, ProfileCommand},
        config::{Config, Profile},
        test_displays::FakeDisplays,
    };

    use super::{CommandError, Session};

    fn run(
        displays: &FakeDisplays,
        config: &mut Config,
        command: Command,
    ) -> (Result<(), String>, String) {
        let mut out = Vec::new();
        let result = Session::new(displays, config, &mut out)
            .and_then(|mut session| session.run(command))
            .map_err(|e| e.to_string());

        (result, String::from_utf8(out).unwrap())
    }

    fn set(display: &str, code: &str) -> Command {
        Command::Set {
            display: display.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn lists_displays() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();
        config
            .names
            .insert("104NTAB12345".to_string(), "Right".to_string());

        let (result, out) = run(&displays, &mut config, Command::List);
        result.unwrap();

        assert_eq!(
            out,
            "0: DELL U2415 [7MT0186K1ABL] \\\\.\\DISPLAY1\n\
             1: Right [104NTAB12345] \\\\.\\DISPLAY2\n\
             2: Acer XF270H [T77AA0012345] \\\\.\\DISPLAY3\n"
        );
    }

    #[test]
    fn lists_inputs_with_current() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();

        let (result, out) = run(
            &displays,
            &mut config,
            Command::Inputs {
                display: "1".to_string(),
            },
        );
        result.unwrap();

        assert_eq!(out, "  0F  DisplayPort 1\n* 11  HDMI 1\n  12  HDMI 2\n");
    }

    #[test]
    fn current_uses_low_byte() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();

        let (result, out) = run(
            &displays,
            &mut config,
            Command::Current {
                display: "T77AA0012345".to_string(),
            },
        );
        result.unwrap();

        assert_eq!(out, "11  HDMI 1\n");
    }

    #[test]
    fn set_switches_input() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();

        let (result, out) = run(&displays, &mut config, set("0", "12"));
        result.unwrap();

        assert_eq!(displays.inputs.borrow()[0], 0x12);
        assert_eq!(displays.writes.get(), 1);
        assert_eq!(out, "DELL U2415 switched to 12  HDMI 2\n");
    }

    #[test]
    fn set_to_current_input_does_nothing() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();

        let (result, out) = run(&displays, &mut config, set("0", "0f"));
        result.unwrap();

        assert_eq!(displays.writes.get(), 0);
        assert_eq!(out, "DELL U2415 is already on 0F  DisplayPort 1\n");
    }

    #[test]
    fn set_times_out() {
        let displays = FakeDisplays::new();
        displays.stuck.set(true);
        let mut config = Config {
            input_change_timeout_ms: 0,
            ..Config::default()
        };

        let (result, _) = run(&displays, &mut config, set("0", "11"));

        assert_eq!(
            result.unwrap_err(),
            "DELL U2415 did not switch to input 11 within 0ms"
        );
        assert_eq!(displays.writes.get(), 1);
    }

    #[test]
    fn set_rejects_bad_input() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();

        let (result, _) = run(&displays, &mut config, set("0", "HDMI"));
        assert_eq!(
            result.unwrap_err(),
            "'HDMI' is not a two digit hex input code"
        );

        for code in ["F", "+0F", "0x0F", "111"] {
            let (result, _) = run(&displays, &mut config, set("0", code));
            assert_eq!(
                result.unwrap_err(),
                format!("'{code}' is not a two digit hex input code")
            );
        }

        let (result, _) = run(&displays, &mut config, set("7", "11"));
        assert_eq!(result.unwrap_err(), "No display matches '7'");

        assert_eq!(displays.writes.get(), 0);
    }

    #[test]
    fn renames_displays() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();

        let rename = |name: &str| Command::Rename {
            display: "LG ULTRAGEAR".to_string(),
            name: name.to_string(),
        };

        run(&displays, &mut config, rename(" Right ")).0.unwrap();
        assert_eq!(config.names["104NTAB12345"], "Right");

        let (result, _) = run(
            &displays,
            &mut config,
            Command::Current {
                display: "Right".to_string(),
            },
        );
        result.unwrap();

        run(&displays, &mut config, rename("")).0.unwrap();
        assert!(config.names.is_empty());
    }

    #[test]
    fn saves_and_loads_profiles() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();

        let profile = |command| Command::Profile { command };

        run(
            &displays,
            &mut config,
            profile(ProfileCommand::Save {
                name: "work".to_string(),
            }),
        )
        .0
        .unwrap();

        assert_eq!(
            config.profiles["work"],
            Profile::from([
                ("7MT0186K1ABL".to_string(), "0F".to_string()),
                ("104NTAB12345".to_string(), "11".to_string()),
                ("T77AA0012345".to_string(), "11".to_string()),
            ])
        );

        *displays.inputs.borrow_mut() = vec![0x11, 0x12, 0x11];

        run(
            &displays,
            &mut config,
            profile(ProfileCommand::Load {
                name: "work".to_string(),
            }),
        )
        .0
        .unwrap();

        assert_eq!(*displays.inputs.borrow(), [0x0F, 0x11, 0x11]);
        assert_eq!(displays.writes.get(), 2);
    }

    #[test]
    fn profile_skips_missing_displays() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();
        config.profiles.insert(
            "gaming".to_string(),
            Profile::from([
                ("104NTAB12345".to_string(), "0F".to_string()),
                ("DISCONNECTED".to_string(), "11".to_string()),
            ]),
        );

        let (result, _) = run(
            &displays,
            &mut config,
            Command::Profile {
                command: ProfileCommand::Load {
                    name: "gaming".to_string(),
                },
            },
        );
        result.unwrap();

        assert_eq!(*displays.inputs.borrow(), [0x0F, 0x0F, 0x0111]);
        assert_eq!(displays.writes.get(), 1);
    }

    #[test]
    fn toggles_between_profiles() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();
        config.profiles.insert(
            "a".to_string(),
            Profile::from([("7MT0186K1ABL".to_string(), "11".to_string())]),
        );
        config.profiles.insert(
            "b".to_string(),
            Profile::from([("7MT0186K1ABL".to_string(), "0F".to_string())]),
        );

        let toggle = || Command::Profile {
            command: ProfileCommand::Toggle {
                first: "a".to_string(),
                second: "b".to_string(),
            },
        };

        run(&displays, &mut config, toggle()).0.unwrap();
        assert_eq!(displays.inputs.borrow()[0], 0x11);
        assert_eq!(config.last_profile.as_deref(), Some("a"));

        run(&displays, &mut config, toggle()).0.unwrap();
        assert_eq!(displays.inputs.borrow()[0], 0x0F);
        assert_eq!(config.last_profile.as_deref(), Some("b"));

        run(&displays, &mut config, toggle()).0.unwrap();
        assert_eq!(displays.inputs.borrow()[0], 0x11);
        assert_eq!(displays.writes.get(), 3);
    }

    #[test]
    fn unknown_profile() {
        let displays = FakeDisplays::new();
        let mut config = Config::default();
        let mut out = Vec::new();

        let mut session = Session::new(&displays, &mut config, &mut out).unwrap();
        let error = session
            .run(Command::Profile {
                command: ProfileCommand::Load {
                    name: "missing".to_string(),
                },
            })
            .unwrap_err();

        assert!(matches!(error, CommandError::NoSuchProfile(ref name) if name == "missing"));
    }
}
