use clap::{App, AppSettings, Arg, SubCommand};

const TEMPLATE: &'static str = "\
{bin} {version}
{author}
{about}

USAGE:
    {usage}

SUBCOMMANDS:
{subcommands}

OPTIONS:
{unified}";

const TEMPLATE_SUB: &'static str = "\
{before-help}
USAGE:
    {usage}

ARGS:
{positionals}

OPTIONS:
{unified}";

const ABOUT: &'static str = "
ucd-tablegen reads the Unicode character database and the Default Unicode
Collation Element Table (DUCET) and emits compact, statically-linkable
Rust lookup tables for normalization, simple lowercasing, combining-class
lookup and level-1 collation-weight lookup.

Tables are packed with a two-level trie (for per-codepoint arrays) or with
a bucketed hash table (for the DUCET), rather than emitted as plain sorted
ranges, since both are dense enough that a trie or hash table pays for
itself in size and lookup speed.";

const ABOUT_TABLES: &'static str = "\
tables parses UnicodeData.txt and CompositionExclusions.txt and emits the
default set of tables: the lowercase-offset trie, the canonical-combining-
class trie, the interesting-codepoint cross-reference table, the
decomposition-sequence pool and its start-index trie, and the composition-
sequence pool and its start-index trie.
";

const ABOUT_COLLATION: &'static str = "\
collation parses allkeys.txt (the DUCET) and emits the level-1 collation
hash table (ducet_data, ducet_bucket_indexes) along with the hash
function's compile-time parameters.
";

/// Build the clap application.
pub fn app() -> App<'static, 'static> {
    let ucd_dir = Arg::with_name("ucd-dir")
        .required(true)
        .help("Directory containing the Unicode character database files.");
    let flag_name = |default| {
        Arg::with_name("name")
            .long("name")
            .help("Set the name used to label diagnostic output.")
            .takes_value(true)
            .default_value(default)
    };
    let flag_out = Arg::with_name("out")
        .short("o")
        .long("out")
        .help("Write output to this file instead of stdout.")
        .takes_value(true);

    let cmd_tables = SubCommand::with_name("tables")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .template(TEMPLATE_SUB)
        .about("Emit the default-mode normalization/case tables.")
        .before_help(ABOUT_TABLES)
        .arg(ucd_dir.clone())
        .arg(flag_name("UCD"))
        .arg(flag_out.clone());

    let cmd_collation = SubCommand::with_name("collation")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .template(TEMPLATE_SUB)
        .about("Emit the DUCET level-1 hash table.")
        .before_help(ABOUT_COLLATION)
        .arg(ucd_dir.clone())
        .arg(flag_name("DUCET"))
        .arg(flag_out.clone());

    App::new("ucd-tablegen")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about(ABOUT)
        .template(TEMPLATE)
        .max_term_width(100)
        .setting(AppSettings::UnifiedHelpMessage)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(cmd_tables)
        .subcommand(cmd_collation)
}
