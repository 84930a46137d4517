use crate::compile::compile_source;
use crate::options::GenOptions;

fn gen_file(file: &str, source: &str) -> String {
    compile_source(source, file, &GenOptions::default())
        .unwrap_or_else(|diags| panic!("compile failed: {:?}", diags))
        .go_source
}

fn gen(source: &str) -> String {
    gen_file("app.kuki", source)
}

#[test]
fn header_names_generator_and_version() {
    let go = gen("func main()\n    print(\"hi\")\n");
    assert!(go.starts_with("// Code generated by kukicha v"));
    assert!(go.contains("package main"));
}

#[test]
fn package_declaration_carries_over() {
    let go = gen("petiole tools\nfunc Noop()\n    return\n");
    assert!(go.contains("package tools"));
}

#[test]
fn interpolated_print_becomes_printf() {
    let go = gen("func main()\n    name := \"World\"\n    print(\"Hello, {name}!\")\n");
    assert!(go.contains("name := \"World\""), "{}", go);
    assert!(go.contains("fmt.Printf(\"Hello, %v!\\n\", name)"), "{}", go);
    assert!(go.contains("\"fmt\""), "{}", go);
}

#[test]
fn plain_print_becomes_println() {
    let go = gen("func main()\n    print(\"done\", 3)\n");
    assert!(go.contains("fmt.Println(\"done\", 3)"), "{}", go);
}

#[test]
fn skill_declaration_redirects_print_to_stderr() {
    let go = gen("skill \"weather\"\nfunc main()\n    print(\"ready\")\n");
    assert!(go.contains("fmt.Fprintln(os.Stderr, \"ready\")"), "{}", go);
    assert!(go.contains("\"os\""), "{}", go);
}

#[test]
fn line_directives_reference_source() {
    let go = gen("func main()\n    print(\"hi\")\n");
    assert!(go.contains("//line app.kuki:1"), "{}", go);
    assert!(go.contains("//line app.kuki:2"), "{}", go);
}

// =========================================================================
// OnErr expansion
// =========================================================================

const FETCH_PRELUDE: &str = "func fetchData() (string, error)\n    return \"\", empty\n";

#[test]
fn onerr_panic_binds_fresh_error_variable() {
    let source = format!(
        "{}func main()\n    data := fetchData() onerr panic \"failed: {{error}}\"\n    print(data)\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(go.contains("data, err_1 := fetchData()"), "{}", go);
    assert!(go.contains("if err_1 != nil {"), "{}", go);
    assert!(
        go.contains("panic(fmt.Sprintf(\"failed: %v\", err_1))"),
        "{}",
        go
    );
}

#[test]
fn sibling_onerr_uses_get_distinct_variables() {
    let source = format!(
        "{}func main()\n    a := fetchData() onerr panic \"a: {{error}}\"\n    b := fetchData() onerr panic \"b: {{error}}\"\n    print(a, b)\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(go.contains("a, err_1 := fetchData()"), "{}", go);
    assert!(go.contains("b, err_2 := fetchData()"), "{}", go);
}

#[test]
fn bare_onerr_propagates_with_zero_values() {
    let source = format!(
        "{}func load() (int, error)\n    data := fetchData() onerr\n    print(data)\n    return 1, empty\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(go.contains("data, err_1 := fetchData()"), "{}", go);
    assert!(go.contains("return 0, err_1"), "{}", go);
}

#[test]
fn onerr_alias_substitutes_in_interpolation() {
    let source = format!(
        "{}func main()\n    data := fetchData() onerr as cause panic \"broke: {{cause}}\"\n    print(data)\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(
        go.contains("panic(fmt.Sprintf(\"broke: %v\", err_1))"),
        "{}",
        go
    );
}

#[test]
fn onerr_fallback_assigns_default() {
    let source = format!(
        "{}func main()\n    data := fetchData() onerr \"fallback\"\n    print(data)\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(go.contains("data = \"fallback\""), "{}", go);
}

#[test]
fn onerr_discard_blanks_all_results() {
    let source = format!(
        "{}func main()\n    fetchData() onerr discard\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(go.contains("_, _ = fetchData()"), "{}", go);
    assert!(!go.contains("!= nil"), "{}", go);
}

#[test]
fn onerr_discard_keeps_bound_names() {
    let source = format!(
        "{}func main()\n    data := fetchData() onerr discard\n    print(data)\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(go.contains("data, _ := fetchData()"), "{}", go);
}

#[test]
fn onerr_explain_wraps_before_propagating() {
    let source = format!(
        "{}func load() (string, error)\n    data := fetchData() onerr explain \"loading config\"\n    return data, empty\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(
        go.contains("err_1 = fmt.Errorf(\"loading config: %w\", err_1)"),
        "{}",
        go
    );
    assert!(go.contains("return \"\", err_1"), "{}", go);
}

#[test]
fn onerr_return_substitutes_error_identifier() {
    let source = format!(
        "{}func load() (string, error)\n    data := fetchData() onerr return \"\", error\n    return data, empty\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(go.contains("return \"\", err_1"), "{}", go);
}

#[test]
fn onerr_error_constructor_replaces_the_error() {
    let source = format!(
        "{}func load() (string, error)\n    data := fetchData() onerr error \"context gone: {{error}}\"\n    return data, empty\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(
        go.contains("return \"\", fmt.Errorf(\"context gone: %v\", err_1)"),
        "{}",
        go
    );
}

#[test]
fn onerr_block_handler_sees_error_variable() {
    let source = format!(
        "{}func main()\n    data := fetchData() onerr\n        print(\"problem: {{error}}\")\n        data = \"none\"\n    print(data)\n",
        FETCH_PRELUDE
    );
    let go = gen(&source);
    assert!(
        go.contains("fmt.Printf(\"problem: %v\\n\", err_1)"),
        "{}",
        go
    );
    assert!(go.contains("data = \"none\""), "{}", go);
}

// =========================================================================
// Pipes
// =========================================================================

#[test]
fn pipe_chain_composes_single_return_calls() {
    let source = concat!(
        "func trim(s string) string\n    return s\n",
        "func upper(s string) string\n    return s\n",
        "func main()\n    x := \"hi\" |> trim() |> upper()\n    print(x)\n",
    );
    let go = gen(source);
    assert!(go.contains("x := upper(trim(\"hi\"))"), "{}", go);
}

#[test]
fn pipe_placeholder_takes_value_in_place() {
    let source = concat!(
        "import \"stdlib/json\"\n",
        "func emit(w any, todo any)\n",
        "    todo |> json.MarshalWrite(w, _)\n",
    );
    let go = gen(source);
    assert!(go.contains("json.MarshalWrite(w, todo)"), "{}", go);
}

#[test]
fn bare_identifier_pipe_applies_function() {
    let source = concat!(
        "func shout(s string) string\n    return s\n",
        "func main()\n    \"hey\" |> shout |> print\n",
    );
    let go = gen(source);
    assert!(go.contains("fmt.Println(shout(\"hey\"))"), "{}", go);
}

#[test]
fn multi_return_pipe_flattens_under_onerr() {
    let source = concat!(
        "func load(path string) (string, error)\n    return path, empty\n",
        "func parse(s string) (string, error)\n    return s, empty\n",
        "func main()\n",
        "    result := \"cfg\" |> load() |> parse() onerr panic \"bad: {error}\"\n",
        "    print(result)\n",
    );
    let go = gen(source);
    assert!(go.contains("tmp_"), "{}", go);
    assert!(go.contains("load(\"cfg\")"), "{}", go);
    let checks = go.matches("!= nil {").count();
    assert_eq!(checks, 2, "one check per multi-return stage: {}", go);
    assert!(go.contains("result, err_"), "{}", go);
}

// =========================================================================
// Imports
// =========================================================================

#[test]
fn stdlib_import_paths_are_rewritten() {
    let source = concat!(
        "import \"stdlib/strings\"\n",
        "func main()\n    print(strings.Upper(\"x\"))\n",
    );
    let go = gen(source);
    assert!(
        go.contains("\"github.com/kukicha-lang/kukicha/stdlib/strings\""),
        "{}",
        go
    );
}

#[test]
fn module_base_is_configurable() {
    let source = "import \"stdlib/strings\"\nfunc main()\n    print(strings.Upper(\"x\"))\n";
    let options = GenOptions::default().with_module_base("example.com/fork");
    let go = compile_source(source, "app.kuki", &options).unwrap().go_source;
    assert!(go.contains("\"example.com/fork/stdlib/strings\""), "{}", go);
}

#[test]
fn colliding_stdlib_package_gets_kuki_prefix() {
    let source = concat!(
        "import \"strings\"\n",
        "import \"stdlib/strings\"\n",
        "func main()\n    print(strings.Upper(\"x\"))\n",
    );
    let go = gen(source);
    assert!(
        go.contains("kukistrings \"github.com/kukicha-lang/kukicha/stdlib/strings\""),
        "{}",
        go
    );
}

#[test]
fn version_suffix_paths_alias_to_penultimate_segment() {
    let source = concat!(
        "import \"github.com/acme/yaml/v3\"\n",
        "func main()\n    print(yaml.Marshal(1))\n",
    );
    let go = gen(source);
    assert!(go.contains("yaml \"github.com/acme/yaml/v3\""), "{}", go);
}

#[test]
fn predeclared_name_collision_gets_kuki_prefix() {
    let source = concat!(
        "import \"acme.dev/util/string\"\n",
        "func main()\n    print(string.Pad(\"x\"))\n",
    );
    let go = gen(source);
    assert!(go.contains("kukistring \"acme.dev/util/string\""), "{}", go);
    assert!(go.contains("kukistring.Pad(\"x\")"), "{}", go);
}

#[test]
fn explicit_alias_is_honored() {
    let source = concat!(
        "import \"net/http\" as web\n",
        "func main()\n    print(web.StatusOK)\n",
    );
    let go = gen(source);
    assert!(go.contains("web \"net/http\""), "{}", go);
}

#[test]
fn error_literal_pulls_errors_import() {
    let source = "func fail() error\n    return error \"boom\"\n";
    let go = gen(source);
    assert!(go.contains("errors.New(\"boom\")"), "{}", go);
    assert!(go.contains("\"errors\""), "{}", go);
}

// =========================================================================
// Statements
// =========================================================================

#[test]
fn descending_numeric_loop_steps_down() {
    let source = "func main()\n    for i from 10 to 0\n        print(i)\n";
    let go = gen(source);
    assert!(go.contains("start_1, end_1, step_1 := 10, 0, 1"), "{}", go);
    assert!(go.contains("step_1 = -1"), "{}", go);
    assert!(
        go.contains("for i := start_1; i != end_1; i += step_1 {"),
        "{}",
        go
    );
}

#[test]
fn inclusive_numeric_loop_includes_endpoint() {
    let source = "func main()\n    for i from 1 through 3\n        print(i)\n";
    let go = gen(source);
    assert!(go.contains("i != end_1+step_1"), "{}", go);
}

#[test]
fn ascending_from_zero_uses_range_loop() {
    let source = "func main()\n    for i from 0 to 10\n        print(i)\n";
    let go = gen(source);
    assert!(go.contains("for i := range 10 {"), "{}", go);
}

#[test]
fn for_range_forms() {
    let source = concat!(
        "func main()\n",
        "    xs := [1, 2, 3]\n",
        "    for x in xs\n        print(x)\n",
        "    for i, x in xs\n        print(i, x)\n",
    );
    let go = gen(source);
    assert!(go.contains("for _, x := range xs {"), "{}", go);
    assert!(go.contains("for i, x := range xs {"), "{}", go);
}

#[test]
fn iterator_stdlib_ranges_single_variable() {
    let source = concat!(
        "petiole iter\n",
        "func Each(seq list of any, visit func(any))\n",
        "    for item in seq\n",
        "        visit(item)\n",
    );
    let go = gen_file("stdlib/iter/each.kuki", source);
    assert!(go.contains("for item := range seq {"), "{}", go);
}

#[test]
fn go_block_launches_anonymous_function() {
    let source = concat!(
        "func main()\n",
        "    results := make(channel of int, 1)\n",
        "    go\n",
        "        send 1 to results\n",
        "    print(receive results)\n",
    );
    let go = gen(source);
    assert!(go.contains("go func() {"), "{}", go);
    assert!(go.contains("results <- 1"), "{}", go);
    assert!(go.contains("}()"), "{}", go);
    assert!(go.contains("<-results"), "{}", go);
}

#[test]
fn select_cases_lower_to_channel_operations() {
    let source = concat!(
        "func main()\n",
        "    inbox := make(channel of string)\n",
        "    done := make(channel of bool)\n",
        "    retries := make(channel of int)\n",
        "    select\n",
        "        when msg := receive inbox\n            print(msg)\n",
        "        when v, ok := receive done\n            print(v, ok)\n",
        "        when receive inbox\n            print(\"drained\")\n",
        "        when send 1 to retries\n            print(\"queued\")\n",
        "        otherwise\n            print(\"idle\")\n",
    );
    let go = gen(source);
    assert!(go.contains("case msg := <-inbox:"), "{}", go);
    assert!(go.contains("case v, ok := <-done:"), "{}", go);
    assert!(go.contains("case <-inbox:"), "{}", go);
    assert!(go.contains("case retries <- 1:"), "{}", go);
    assert!(go.contains("default:"), "{}", go);
}

#[test]
fn switch_with_cases_and_default() {
    let source = concat!(
        "func describe(code int) string\n",
        "    switch code\n",
        "        when 200, 201\n            return \"ok\"\n",
        "        otherwise\n            return \"other\"\n",
    );
    let go = gen(source);
    assert!(go.contains("switch code {"), "{}", go);
    assert!(go.contains("case 200, 201:"), "{}", go);
    assert!(go.contains("default:"), "{}", go);
}

#[test]
fn type_switch_lowering() {
    let source = concat!(
        "func describe(x any) string\n",
        "    switch v := x.(type)\n",
        "        when int\n            return \"int\"\n",
        "        when string\n            return v\n",
        "        otherwise\n            return \"other\"\n",
    );
    let go = gen(source);
    assert!(go.contains("switch v := x.(type) {"), "{}", go);
    assert!(go.contains("case int:"), "{}", go);
}

#[test]
fn method_receiver_forms() {
    let source = concat!(
        "type Counter\n    value int\n",
        "func Value on c Counter() int\n    return c.value\n",
        "func Scale on c reference Counter(factor int)\n    c.value = c.value * factor\n",
    );
    let go = gen(source);
    assert!(go.contains("func (c Counter) Value() int {"), "{}", go);
    assert!(go.contains("func (c *Counter) Scale(factor int) {"), "{}", go);
}

#[test]
fn struct_with_json_alias_tag() {
    let source = "type Todo\n    id int\n    title string \"task_title\"\n";
    let go = gen(source);
    assert!(go.contains("type Todo struct {"), "{}", go);
    assert!(go.contains("title string `json:\"task_title\"`"), "{}", go);
}

#[test]
fn named_scalar_return_is_coerced() {
    let source = concat!(
        "type Duration int64\n",
        "func span(a int, b int) Duration\n",
        "    return a * b\n",
    );
    let go = gen(source);
    assert!(go.contains("return Duration(a * b)"), "{}", go);
}

#[test]
fn identifier_returns_skip_coercion() {
    let source = concat!(
        "type Duration int64\n",
        "func pass(d Duration) Duration\n",
        "    return d\n",
    );
    let go = gen(source);
    assert!(go.contains("return d"), "{}", go);
    assert!(!go.contains("Duration(d)"), "{}", go);
}

#[test]
fn address_of_call_uses_new() {
    let source = concat!(
        "type Point\n    x int\n",
        "func origin() Point\n    return Point{x: 0}\n",
        "func main()\n    p := reference origin()\n    print(p)\n",
    );
    let go = gen(source);
    assert!(go.contains("p := new(origin())"), "{}", go);
}

#[test]
fn numeric_literal_bases_round_trip() {
    let source = "func main()\n    print(0xFF, 0b1010, 0755, 42)\n";
    let go = gen(source);
    assert!(go.contains("0xFF"), "{}", go);
    assert!(go.contains("0b1010"), "{}", go);
    assert!(go.contains("0755"), "{}", go);
}

#[test]
fn named_args_and_defaults_expand_at_call_site() {
    let source = concat!(
        "func greet(name string = \"World\", times int = 1) string\n",
        "    return name\n",
        "func main()\n",
        "    print(greet(times: 2))\n",
        "    print(greet())\n",
    );
    let go = gen(source);
    assert!(go.contains("greet(\"World\", 2)"), "{}", go);
    assert!(go.contains("greet(\"World\", 1)"), "{}", go);
}

#[test]
fn variadic_spread_renders_ellipsis() {
    let source = concat!(
        "func sum(nums many int) int\n    return 0\n",
        "func main()\n    xs := [1, 2]\n    print(sum(xs many))\n",
    );
    let go = gen(source);
    assert!(go.contains("sum(nums ...int) int"), "{}", go);
    assert!(go.contains("sum(xs...)"), "{}", go);
}

#[test]
fn interpolation_cast_lowers_to_conversion() {
    let source = "func main()\n    count := 3\n    print(\"{count as float} items\")\n";
    let go = gen(source);
    assert!(go.contains("float64(count)"), "{}", go);
}

// =========================================================================
// Generic inference in stdlib files
// =========================================================================

#[test]
fn stdlib_slice_placeholder_becomes_type_parameter() {
    let source = concat!(
        "petiole slices\n",
        "func Filter(items list of any, predicate func(any) bool) list of any\n",
        "    kept := [1]\n",
        "    return kept\n",
    );
    let go = gen_file("stdlib/slices/filter.kuki", source);
    assert!(
        go.contains("func Filter[T any](items []T, predicate func(T) bool) []T {"),
        "{}",
        go
    );
}

#[test]
fn map_key_placeholder_is_comparable() {
    let source = concat!(
        "petiole slices\n",
        "func Group(items list of any, key func(any) any2) map of any2 to list of any\n",
        "    out := map of any2 to list of any{}\n",
        "    return out\n",
    );
    let go = gen_file("stdlib/slices/group.kuki", source);
    assert!(go.contains("[T any, K comparable]"), "{}", go);
    assert!(go.contains("map[K][]T"), "{}", go);
}

#[test]
fn bare_placeholder_return_needs_allowlist() {
    let kept = concat!(
        "petiole slices\n",
        "func First(items list of any) any\n",
        "    return items[0]\n",
    );
    let go = gen_file("stdlib/slices/first.kuki", kept);
    assert!(go.contains("func First[T any](items []T) T {"), "{}", go);

    let skipped = concat!(
        "petiole slices\n",
        "func Pick(items list of any) any\n",
        "    return items[0]\n",
    );
    let go = gen_file("stdlib/slices/pick.kuki", skipped);
    assert!(go.contains("func Pick(items []any) any {"), "{}", go);
}

#[test]
fn placeholders_outside_stdlib_stay_plain() {
    let source = "func Keep(items list of any) list of any\n    return items\n";
    let go = gen(source);
    assert!(go.contains("func Keep(items []any) []any {"), "{}", go);
}
