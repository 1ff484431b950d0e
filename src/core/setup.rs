//! The setup orchestrator.
//!
//! One non-restartable run that turns a freshly generated Rails skeleton
//! into a configured project: Gemfile cleanup and dependency declarations,
//! config patches, install and generator commands, and initial git/GitHub
//! setup. The sequence is fixed; the only branching is prompt-driven
//! feature selection and the guard that skips remote creation when a
//! remote already exists.
//!
//! Failed commands are recorded in the report and the run continues,
//! except for `bundle install`, which everything after it depends on.
//! Filesystem errors always stop the run.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::anchor::{Anchor, Placement};
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::manifest::{self, Dependency};
use crate::patch::{self, PatchOutcome};
use crate::process::{CommandOutput, Runner};
use crate::prompt::Prompter;
use crate::utils::io;
use crate::{git, github, log_status};

const GENERATORS_RB: &str = r##"Rails.application.config.generators do |g|
  g.test_framework :rspec,
    fixtures:         true,
    view_specs:       false,
    helper_specs:     false,
    routing_specs:    false,
    controller_specs: true,
    request_specs:    true
  g.fixture_replacement :factory_girl, dir: "spec/factories"
end
"##;

const BULLET_BLOCK: &str = r##"
  # Bullet
  config.after_initialize do
    Bullet.enable         = true
    Bullet.alert          = false
    Bullet.bullet_logger  = true
    Bullet.console        = true
    Bullet.rails_logger   = true
    Bullet.add_footer     = true
  end
"##;

const SPEC_HELPER_REQUIRES: &str = r##"
require 'simplecov'
require 'factory_girl'
require 'factory_girl_rails'
require 'awesome_print'
SimpleCov.start 'rails' do
  add_filter '/config/'

  add_group 'Controllers',  'app/controllers'
  add_group 'Models',       'app/models'
  add_group 'Helpers',      'app/helpers'
  add_group 'Mailers',      'app/mailers'
  add_group 'Libraries',    'lib'
end
"##;

const SPEC_HELPER_CLEANER: &str = r##"
  config.before(:all) do
    DeferredGarbageCollection.start
  end

  config.after(:all) do
    DeferredGarbageCollection.reconsider
  end

  config.before(:suite) do
    DatabaseCleaner.clean_with(:truncation)
  end

  config.before(:each) do
    DatabaseCleaner.strategy = :transaction
    DatabaseCleaner.start
  end

  config.before(:each, js: true) do
    DatabaseCleaner.strategy = :truncation
  end

  config.after(:each) do
    DatabaseCleaner.clean
  end
"##;

const UNICORN_RB: &str = r##"worker_processes Integer(ENV["WEB_CONCURRENCY"] || 3)
timeout 15
preload_app true

before_fork do |server, worker|
  Signal.trap 'TERM' do
    puts 'Unicorn master intercepting TERM and sending myself QUIT instead'
    Process.kill 'QUIT', Process.pid
  end

  defined?(ActiveRecord::Base) and
    ActiveRecord::Base.connection.disconnect!
end

after_fork do |server, worker|
  Signal.trap 'TERM' do
    puts 'Unicorn worker intercepting TERM and doing nothing. Wait for master to send QUIT'
  end

  defined?(ActiveRecord::Base) and
    ActiveRecord::Base.establish_connection
end
"##;

const COMMON_IGNORES: &str = r##"/.bundle
/db/*.sqlite3
/db/*.sqlite3-journal
/log/*.log
/tmp
database.yml
.env
doc/
*.swp
*~
.project
.idea
.secret
.DS_Store"##;

const BASE_GEMS: &[&str] = &[
    "bcrypt",
    "unicorn",
    "sass-rails",
    "compass-rails",
    "sprockets",
    "sprockets-sass",
];

const DEVELOPMENT_GEMS: &[&str] = &[
    "guard",
    "guard-rails",
    "guard-livereload",
    "guard-bundler",
    "guard-rspec",
    "guard-brakeman",
    "better_errors",
    "binding_of_caller",
    "meta_request",
    "awesome_print",
    "bullet",
    "debugger",
    "spring",
    "spring-commands-rspec",
];

const TEST_GEMS: &[&str] = &[
    "faker",
    "capybara",
    "rspec_candy",
    "database_cleaner",
    "fakeweb",
    "delorean",
    "rspec-rails",
    "mocha",
    "shoulda-matchers",
    "factory_girl_rails",
    "fuubar",
];

const PRODUCTION_GEMS: &[&str] = &["rails_12factor"];

#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    /// Run even when the target carries a stamp from an earlier run.
    pub force: bool,
    /// Skip the GitHub repository prompt entirely.
    pub skip_github: bool,
}

/// One recorded step of the run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step: String,
    pub detail: String,
    pub ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupReport {
    pub target: String,
    pub app_name: String,
    pub steps: Vec<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_remote: Option<String>,
    pub stamped: bool,
}

/// Marker written to the target after a successful run.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStamp {
    pub tool: String,
    pub version: String,
    pub created_unix: u64,
}

impl SetupStamp {
    pub fn current() -> Self {
        Self {
            tool: "groundwork".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_unix: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    pub fn load(ctx: &RunContext) -> Option<Self> {
        let content = std::fs::read_to_string(ctx.stamp_path()).ok()?;
        serde_json::from_str(&content).ok()
    }
}

/// Execute the full setup sequence against the target.
pub fn run(ctx: &RunContext, prompter: &dyn Prompter, opts: &SetupOptions) -> Result<SetupReport> {
    if !ctx.has_manifest() {
        return Err(Error::setup_manifest_missing(
            ctx.target.display().to_string(),
        ));
    }

    if ctx.is_configured() && !opts.force {
        return Err(Error::setup_already_configured(
            ctx.stamp_path().display().to_string(),
        ));
    }

    let mut setup = SetupRun {
        ctx,
        runner: Runner::new(&ctx.target),
        report: SetupReport {
            target: ctx.target.display().to_string(),
            app_name: ctx.app_name.clone(),
            steps: Vec::new(),
            github_remote: None,
            stamped: false,
        },
    };

    setup.pin_runtime()?;
    setup.choose_database(prompter)?;
    setup.choose_template_engine(prompter)?;
    setup.clean_manifest_comments()?;
    setup.declare_base_gems()?;
    setup.declare_groups()?;
    setup.strip_manifest_blank_lines()?;
    setup.write_generator_config()?;
    setup.patch_development_config()?;
    setup.write_process_files()?;
    setup.bundle_install()?;
    setup.install_rspec()?;
    setup.patch_spec_helper()?;
    setup.finish_tooling()?;
    setup.write_unicorn_config()?;
    setup.append_common_ignores()?;
    setup.git_setup()?;
    setup.github_setup(prompter, opts)?;
    setup.write_stamp()?;

    Ok(setup.report)
}

struct SetupRun<'a> {
    ctx: &'a RunContext,
    runner: Runner,
    report: SetupReport,
}

impl SetupRun<'_> {
    fn record(&mut self, step: &str, detail: impl Into<String>, ok: bool) {
        self.report.steps.push(StepReport {
            step: step.to_string(),
            detail: detail.into(),
            ok,
        });
    }

    fn record_patch(&mut self, step: &str, outcome: &PatchOutcome) {
        let detail = if outcome.applied {
            format!("patched {}", outcome.path)
        } else {
            format!("skipped (no anchor match in {})", outcome.path)
        };
        self.record(step, detail, true);
    }

    fn record_command(&mut self, step: &str, command: &str, output: &CommandOutput) {
        if output.success {
            self.record(step, command, true);
        } else {
            log_status!("setup", "{} failed (exit {})", command, output.exit_code);
            self.record(
                step,
                format!(
                    "{} failed (exit {}): {}",
                    command,
                    output.exit_code,
                    output.stderr.trim()
                ),
                false,
            );
        }
    }

    fn record_result(&mut self, step: &str, detail: &str, result: Result<()>) {
        match result {
            Ok(()) => self.record(step, detail, true),
            Err(e) => {
                log_status!("setup", "{}: {}", step, e);
                self.record(step, format!("{}: {}", detail, e), false);
            }
        }
    }

    fn pin_runtime(&mut self) -> Result<()> {
        let probe = self.runner.run("ruby -e 'print RUBY_VERSION'");
        let version = probe.stdout.trim().to_string();

        if !probe.success || version.is_empty() {
            self.record("pin runtime", "ruby not available, skipped", true);
            return Ok(());
        }

        let outcome = manifest::pin_runtime(&self.ctx.manifest_path(), &version)?;
        self.record_patch("pin runtime", &outcome);
        Ok(())
    }

    fn choose_database(&mut self, prompter: &dyn Prompter) -> Result<()> {
        let choice = prompter.choose("database", "Choose database", &["sqlite", "mysql", "pg"])?;

        let gem = match choice.as_str() {
            "mysql" => Some("mysql2"),
            "pg" => Some("pg"),
            _ => None,
        };

        match gem {
            Some(name) => {
                manifest::declare(&self.ctx.manifest_path(), &Dependency::new(name))?;
                self.record("database", format!("{} (gem '{}')", choice, name), true);
            }
            None => self.record("database", format!("{} (skeleton default)", choice), true),
        }
        Ok(())
    }

    fn choose_template_engine(&mut self, prompter: &dyn Prompter) -> Result<()> {
        let choice = prompter.choose(
            "template_engine",
            "Choose template engine",
            &["erb", "haml", "slim"],
        )?;

        let gem = match choice.as_str() {
            "haml" => Some("haml-rails"),
            "slim" => Some("slim-rails"),
            _ => None,
        };

        match gem {
            Some(name) => {
                manifest::declare(&self.ctx.manifest_path(), &Dependency::new(name))?;
                self.record("template engine", format!("{} (gem '{}')", choice, name), true);
            }
            None => self.record("template engine", format!("{} (skeleton default)", choice), true),
        }
        Ok(())
    }

    /// Strip comment lines and the stock sass-rails entry; the curated
    /// entry comes back with the base set.
    fn clean_manifest_comments(&mut self) -> Result<()> {
        let manifest_path = self.ctx.manifest_path();
        let comments = patch::strip_lines(&manifest_path, r"^\s*#")?;
        let stock = patch::strip_lines(&manifest_path, r"^gem 'sass-rails'")?;
        self.record(
            "clean manifest",
            format!(
                "removed {} comment lines, {} stock lines",
                comments.count.unwrap_or(0),
                stock.count.unwrap_or(0)
            ),
            true,
        );
        Ok(())
    }

    fn declare_base_gems(&mut self) -> Result<()> {
        let manifest_path = self.ctx.manifest_path();
        for name in BASE_GEMS {
            manifest::declare(&manifest_path, &Dependency::new(*name))?;
        }
        self.record("base gems", format!("{} declared", BASE_GEMS.len()), true);
        Ok(())
    }

    fn declare_groups(&mut self) -> Result<()> {
        let manifest_path = self.ctx.manifest_path();

        let development: Vec<Dependency> =
            DEVELOPMENT_GEMS.iter().map(|n| Dependency::new(*n)).collect();
        manifest::declare_group(&manifest_path, "development", &development)?;

        let mut test: Vec<Dependency> = TEST_GEMS.iter().map(|n| Dependency::new(*n)).collect();
        test.push(Dependency::new("simplecov").with_option("require", "false"));
        manifest::declare_group(&manifest_path, "test", &test)?;

        let production: Vec<Dependency> =
            PRODUCTION_GEMS.iter().map(|n| Dependency::new(*n)).collect();
        manifest::declare_group(&manifest_path, "production", &production)?;

        self.record(
            "gem groups",
            "development, test, production declared",
            true,
        );
        Ok(())
    }

    fn strip_manifest_blank_lines(&mut self) -> Result<()> {
        let outcome = patch::strip_lines(&self.ctx.manifest_path(), r"^[ \t]*$")?;
        self.record(
            "compact manifest",
            format!("removed {} blank lines", outcome.count.unwrap_or(0)),
            true,
        );
        Ok(())
    }

    fn write_generator_config(&mut self) -> Result<()> {
        let outcome = patch::overwrite(
            &self.ctx.join("config/initializers/generators.rb"),
            GENERATORS_RB,
        )?;
        self.record_patch("generator config", &outcome);
        Ok(())
    }

    fn patch_development_config(&mut self) -> Result<()> {
        let outcome = patch::insert(
            &self.ctx.join("config/environments/development.rb"),
            BULLET_BLOCK,
            &Anchor::regex(r"^end"),
            Placement::Before,
            false,
        )?;
        self.record_patch("bullet config", &outcome);
        Ok(())
    }

    fn write_process_files(&mut self) -> Result<()> {
        patch::append(
            &self.ctx.join("Procfile"),
            "web: bundle exec rails server -p $PORT",
        )?;
        patch::append(&self.ctx.join(".env"), "PORT=3000")?;
        patch::append(&self.ctx.join(".gitignore"), ".env")?;
        // Foreman needs unbuffered output to show logs immediately
        patch::append(
            &self.ctx.join("config/environments/development.rb"),
            "STDOUT.sync = true",
        )?;
        self.record("process files", "Procfile, .env, .gitignore", true);
        Ok(())
    }

    fn bundle_install(&mut self) -> Result<()> {
        log_status!("setup", "Running bundle install");
        let output = self.runner.run_checked("bundle install")?;
        self.record_command("bundle install", "bundle install", &output);
        Ok(())
    }

    fn install_rspec(&mut self) -> Result<()> {
        let output = self.runner.run("bundle exec rails generate rspec:install");
        self.record_command("rspec install", "rails generate rspec:install", &output);
        Ok(())
    }

    fn patch_spec_helper(&mut self) -> Result<()> {
        let helper = self.ctx.join("spec/spec_helper.rb");

        // Only present when the rspec generator succeeded; its failure was
        // already recorded, so a missing helper is a skip rather than a stop.
        if !helper.is_file() {
            self.record("spec helper", "spec/spec_helper.rb not present, skipped", false);
            return Ok(());
        }

        let requires = patch::insert(
            &helper,
            SPEC_HELPER_REQUIRES,
            &Anchor::regex(r"^require 'rspec/autorun'"),
            Placement::After,
            false,
        )?;
        self.record_patch("spec helper requires", &requires);

        let cleaner = patch::insert(
            &helper,
            SPEC_HELPER_CLEANER,
            &Anchor::regex(r#"config\.order = "random""#),
            Placement::After,
            false,
        )?;
        self.record_patch("spec helper cleaner", &cleaner);
        Ok(())
    }

    fn finish_tooling(&mut self) -> Result<()> {
        let remove = self.runner.run("rm -rf test/");
        self.record_command("remove test dir", "rm -rf test/", &remove);

        let guard = self
            .runner
            .run("bundle exec guard init bundler rails livereload rspec brakeman");
        self.record_command("guard init", "guard init", &guard);

        let spring = self.runner.run("bundle exec spring binstub --all");
        self.record_command("spring binstubs", "spring binstub --all", &spring);
        Ok(())
    }

    fn write_unicorn_config(&mut self) -> Result<()> {
        let outcome = patch::overwrite(&self.ctx.join("config/unicorn.rb"), UNICORN_RB)?;
        self.record_patch("unicorn config", &outcome);
        Ok(())
    }

    fn append_common_ignores(&mut self) -> Result<()> {
        patch::append(&self.ctx.join(".gitignore"), COMMON_IGNORES)?;
        self.record("ignore file", "common ignore entries appended", true);
        Ok(())
    }

    fn git_setup(&mut self) -> Result<()> {
        let dir = &self.ctx.target;
        let init = git::init(dir);
        self.record_result("git init", "git init", init);

        let add = git::add_all(dir);
        self.record_result("git add", "git add .", add);

        let commit = git::commit(dir, "Initial commit");
        self.record_result("git commit", "Initial commit", commit);
        Ok(())
    }

    fn github_setup(&mut self, prompter: &dyn Prompter, opts: &SetupOptions) -> Result<()> {
        if opts.skip_github {
            self.record("github", "skipped (--skip-github)", true);
            return Ok(());
        }

        if !prompter.confirm("github", "Initialize GitHub repository?")? {
            self.record("github", "declined", true);
            return Ok(());
        }

        if let Some(url) = git::remote_origin_url(&self.ctx.target) {
            self.record("github", format!("repository already exists: {}", url), true);
            return Ok(());
        }

        let username = prompter.ask("github_username", "What is your GitHub username?")?;
        let password = prompter.ask("github_password", "GitHub password or token")?;

        log_status!("setup", "Creating GitHub repository {}", self.ctx.app_name);
        if let Err(e) = github::create_repo(&username, &password, &self.ctx.app_name) {
            self.record("github create", e.to_string(), false);
            return Ok(());
        }
        self.record("github create", format!("created {}", self.ctx.app_name), true);

        let url = github::ssh_remote_url(&username, &self.ctx.app_name);
        let added = git::remote_add(&self.ctx.target, "origin", &url);
        self.record_result("git remote", &format!("origin {}", url), added);
        self.report.github_remote = Some(url);

        let pushed = git::push(&self.ctx.target, "origin", "master");
        self.record_result("git push", "origin master", pushed);
        Ok(())
    }

    fn write_stamp(&mut self) -> Result<()> {
        let stamp = SetupStamp::current();
        let content = serde_json::to_string_pretty(&stamp)
            .map_err(|e| Error::internal_json(e.to_string(), Some("serialize stamp".to_string())))?;
        io::write_file_atomic(&self.ctx.stamp_path(), &content, "write stamp")?;
        self.report.stamped = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_roundtrips_through_json() {
        let stamp = SetupStamp::current();
        let json = serde_json::to_string(&stamp).unwrap();
        let parsed: SetupStamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.tool, "groundwork");
        assert_eq!(parsed.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn base_gem_set_matches_curated_list() {
        assert!(BASE_GEMS.contains(&"bcrypt"));
        assert!(BASE_GEMS.contains(&"unicorn"));
        assert_eq!(BASE_GEMS.len(), 6);
    }
}
