fn main() {
    riskscope_lib::run()
}
