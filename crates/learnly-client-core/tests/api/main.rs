mod login;
mod logout;
mod persistence;
mod sign_in;
