mod enhancer_tests;
