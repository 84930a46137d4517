use kukicha_base::Interner;

use crate::analysis::{Analysis, Analyzer};
use crate::arena_ctx::AstArenas;
use crate::lexer::Lexer;
use crate::parser::Parser;

fn analyze_file(file: &str, source: &str) -> Analysis {
    let mut interner = Interner::new();
    let lexed = Lexer::new(source, &mut interner).tokenize();
    assert!(lexed.errors.is_empty(), "lexer errors: {:?}", lexed.errors);
    let arenas = AstArenas::default();
    let ctx = arenas.context();
    let mut parser = Parser::new(lexed.tokens, &mut interner, ctx);
    let program = parser.parse_program();
    let parse_errors = parser.take_errors();
    assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);
    drop(parser);
    Analyzer::new(file, &interner).analyze(&program)
}

fn analyze(source: &str) -> Analysis {
    analyze_file("app.kuki", source)
}

fn error_messages(analysis: &Analysis) -> Vec<String> {
    analysis.errors().map(|d| d.message.clone()).collect()
}

fn warning_messages(analysis: &Analysis) -> Vec<String> {
    analysis.warnings().map(|d| d.message.clone()).collect()
}

// =========================================================================
// Name resolution and arity
// =========================================================================

#[test]
fn resolves_locals_params_and_builtins() {
    let source = concat!(
        "func add(a int, b int) int\n",
        "    total := a + b\n",
        "    print(total)\n",
        "    return total\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn undefined_name_is_an_error() {
    let source = "func main()\n    print(missing)\n";
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("undefined name 'missing'"));
}

#[test]
fn arity_mismatch_reported() {
    let source = concat!(
        "func pair(a int, b int) int\n",
        "    return a + b\n",
        "func main()\n",
        "    x := pair(1)\n",
        "    y := pair(1, 2, 3)\n",
        "    print(x + y)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 2, "{:?}", errors);
    assert!(errors[0].contains("not enough arguments"));
    assert!(errors[1].contains("too many arguments"));
}

#[test]
fn defaults_relax_required_arity() {
    let source = concat!(
        "func greet(name string = \"World\") string\n",
        "    return name\n",
        "func main()\n",
        "    print(greet())\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn unknown_named_argument_reported() {
    let source = concat!(
        "func greet(name string = \"x\") string\n",
        "    return name\n",
        "func main()\n",
        "    print(greet(who: \"y\"))\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("no parameter named 'who'"));
}

#[test]
fn variadic_accepts_extra_arguments() {
    let source = concat!(
        "func sum(nums many int) int\n",
        "    return 0\n",
        "func main()\n",
        "    print(sum(1, 2, 3, 4))\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn pipe_threads_argument_for_arity() {
    let source = concat!(
        "func double(n int) int\n",
        "    return n * 2\n",
        "func main()\n",
        "    x := 3 |> double()\n",
        "    print(x)\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn duplicate_struct_literal_field_rejected() {
    let source = concat!(
        "type Point\n",
        "    x int\n",
        "    y int\n",
        "func main()\n",
        "    p := Point{x: 1, x: 2}\n",
        "    print(p)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("duplicate field 'x'"));
}

#[test]
fn return_count_mismatch_reported() {
    let source = "func two() (int, int)\n    return 1\n";
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("return supplies 1"));
}

#[test]
fn return_call_passthrough_allowed() {
    let source = concat!(
        "func two() (int, int)\n",
        "    return 1, 2\n",
        "func also() (int, int)\n",
        "    return two()\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn return_pipe_into_multi_value_call_rejected() {
    let source = concat!(
        "func split(s string) (string, string)\n",
        "    return s, s\n",
        "func broken(s string) string\n",
        "    return s |> split()\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("multiple values"));
}

#[test]
fn return_counts_recorded_for_codegen() {
    let source = concat!(
        "func two() (int, error)\n",
        "    return 1, empty\n",
        "func main()\n",
        "    a, b := two()\n",
        "    print(a, b)\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
    assert!(
        analysis.return_counts.values().any(|&n| n == 2),
        "{:?}",
        analysis.return_counts
    );
}

// =========================================================================
// OnErr rules
// =========================================================================

#[test]
fn bare_onerr_return_requires_error_result() {
    let source = concat!(
        "func load() (string, error)\n",
        "    return \"\", empty\n",
        "func broken() string\n",
        "    x := load() onerr return\n",
        "    return x\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("onerr return"));
}

#[test]
fn bare_onerr_return_accepted_with_error_result() {
    let source = concat!(
        "func load() (string, error)\n",
        "    return \"\", empty\n",
        "func ok() (string, error)\n",
        "    x := load() onerr return\n",
        "    return x, empty\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn onerr_discard_warns_outside_test_files() {
    let source = concat!(
        "func load() (string, error)\n",
        "    return \"\", empty\n",
        "func main()\n",
        "    x := load() onerr discard\n",
        "    print(x)\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors());
    let warnings = warning_messages(&analysis);
    assert_eq!(warnings.len(), 1, "{:?}", warnings);
    assert!(warnings[0].contains("discard"));
}

#[test]
fn onerr_discard_silent_in_test_files() {
    let source = concat!(
        "func load() (string, error)\n",
        "    return \"\", empty\n",
        "func main()\n",
        "    x := load() onerr discard\n",
        "    print(x)\n",
    );
    let analysis = analyze_file("app_test.kuki", source);
    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}

#[test]
fn onerr_panic_warns_in_library_package() {
    let source = concat!(
        "petiole storage\n",
        "func load() (string, error)\n",
        "    return \"\", empty\n",
        "func must() string\n",
        "    x := load() onerr panic \"boom\"\n",
        "    return x\n",
    );
    let analysis = analyze(source);
    let warnings = warning_messages(&analysis);
    assert_eq!(warnings.len(), 1, "{:?}", warnings);
    assert!(warnings[0].contains("library"));
}

#[test]
fn onerr_panic_silent_in_main_package() {
    let source = concat!(
        "petiole main\n",
        "func load() (string, error)\n",
        "    return \"\", empty\n",
        "func main()\n",
        "    x := load() onerr panic \"boom\"\n",
        "    print(x)\n",
    );
    let analysis = analyze(source);
    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}

#[test]
fn err_interpolation_in_handler_rejected() {
    let source = concat!(
        "func load() (string, error)\n",
        "    return \"\", empty\n",
        "func main()\n",
        "    x := load() onerr panic \"failed: {err}\"\n",
        "    print(x)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("{error}"), "{:?}", errors);
}

#[test]
fn err_interpolation_suggestion_uses_alias() {
    let source = concat!(
        "func load() (string, error)\n",
        "    return \"\", empty\n",
        "func main()\n",
        "    x := load() onerr as cause panic \"failed: {err}\"\n",
        "    print(x)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("{cause}"), "{:?}", errors);
}

#[test]
fn onerr_return_value_count_checked() {
    let source = concat!(
        "func load() (string, error)\n",
        "    return \"\", empty\n",
        "func wrong() (string, error)\n",
        "    x := load() onerr return \"fallback\"\n",
        "    return x, empty\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("'onerr return' supplies 1"));
}

// =========================================================================
// Security lints
// =========================================================================

#[test]
fn sql_injection_interpolated_query_rejected() {
    let source = concat!(
        "import \"stdlib/pg\"\n",
        "func find(pool pg.Pool, id string)\n",
        "    rows := pg.Query(pool, \"SELECT * FROM u WHERE id = {id}\", id)\n",
        "    print(rows)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("SQL injection risk"));
    assert!(errors[0].contains("$1"));
}

#[test]
fn sql_with_placeholders_accepted() {
    let source = concat!(
        "import \"stdlib/pg\"\n",
        "func find(pool pg.Pool, id string)\n",
        "    rows := pg.Query(pool, \"SELECT * FROM u WHERE id = $1\", id)\n",
        "    print(rows)\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn sql_injection_detected_through_pipe() {
    let source = concat!(
        "import \"stdlib/pg\"\n",
        "func find(pool pg.Pool, id string)\n",
        "    rows := pool |> pg.Query(\"SELECT * FROM u WHERE id = {id}\", id)\n",
        "    print(rows)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("SQL injection risk"));
}

#[test]
fn xss_dynamic_html_rejected() {
    let source = concat!(
        "import \"stdlib/http\"\n",
        "func show(w http.ResponseWriter, page string)\n",
        "    http.HTML(w, page)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("XSS risk"));
    assert!(errors[0].contains("http.SafeHTML"));
}

#[test]
fn ssrf_fetch_inside_handler_rejected() {
    let source = concat!(
        "import \"stdlib/http\"\n",
        "import \"stdlib/fetch\"\n",
        "func proxy(w http.ResponseWriter, url string)\n",
        "    body := fetch.Get(url)\n",
        "    print(body)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("SSRF risk"));
    assert!(errors[0].contains("fetch.SafeGet"));
}

#[test]
fn fetch_outside_handler_accepted() {
    let source = concat!(
        "import \"stdlib/fetch\"\n",
        "func poll(url string)\n",
        "    body := fetch.Get(url)\n",
        "    print(body)\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn path_traversal_files_in_handler_rejected() {
    let source = concat!(
        "import \"stdlib/http\"\n",
        "import \"stdlib/files\"\n",
        "func download(w http.ResponseWriter, name string)\n",
        "    data := files.ReadText(name)\n",
        "    print(data)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("path traversal risk"));
}

#[test]
fn command_injection_dynamic_shell_rejected() {
    let source = concat!(
        "import \"stdlib/shell\"\n",
        "func run(cmd string)\n",
        "    out := shell.Run(cmd)\n",
        "    print(out)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("command injection risk"));
}

#[test]
fn literal_shell_command_accepted() {
    let source = concat!(
        "import \"stdlib/shell\"\n",
        "func run()\n",
        "    out := shell.Run(\"ls\")\n",
        "    print(out)\n",
    );
    let analysis = analyze(source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn open_redirect_dynamic_url_rejected() {
    let source = concat!(
        "import \"stdlib/http\"\n",
        "func jump(w http.ResponseWriter, target string)\n",
        "    http.Redirect(w, target)\n",
    );
    let analysis = analyze(source);
    let errors = error_messages(&analysis);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("open redirect risk"));
    assert!(errors[0].contains("http.SafeRedirect"));
}

#[test]
fn open_redirect_exempt_in_stdlib_source() {
    let source = concat!(
        "import \"stdlib/http\"\n",
        "func jump(w http.ResponseWriter, target string)\n",
        "    http.Redirect(w, target)\n",
    );
    let analysis = analyze_file("stdlib/http/redirect.kuki", source);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);
}

#[test]
fn mcp_target_follows_skill_declaration() {
    let source = "skill \"weather\"\nfunc main()\n    print(\"hi\")\n";
    let analysis = analyze(source);
    assert!(analysis.mcp_target);
}
