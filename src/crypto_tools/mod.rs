pub mod constants;
pub mod group;
pub mod hash;
pub mod primes;
pub mod prng;
pub mod sqrt;
