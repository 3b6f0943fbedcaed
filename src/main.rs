fn main() {
    medrecon_lib::run()
}
